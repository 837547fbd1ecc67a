//! Copysmith Providers - clients for the external research and generation APIs
//!
//! Both clients talk through an injected [`HttpTransport`], so the host decides
//! how requests reach the network and tests can script every response.

pub mod generation;
pub mod research;
pub mod testing;
pub mod transport;
pub mod types;

pub use generation::GenerationClient;
pub use research::ResearchClient;
pub use testing::{ScriptedReply, ScriptedTransport};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use types::*;
