pub mod diagnostics;
pub mod doc_create;
pub mod doc_delete;
pub mod doc_get;
pub mod doc_list;
pub mod health;

pub use diagnostics::*;
pub use doc_create::*;
pub use doc_delete::*;
pub use doc_get::*;
pub use doc_list::*;
pub use health::*;
