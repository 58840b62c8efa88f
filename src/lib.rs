//! Cursor-position queries over PHP source.
//!
//! Two questions an editor asks while the user types:
//!
//! - **Where am I?** [`scope_chain::resolve_scope_chain`] lists the
//!   constructs enclosing an offset, outermost first.
//! - **Which call am I inside?** [`invocation::resolve_invocation`] finds
//!   the innermost function or method call around an offset, its receiver
//!   chain and the argument the cursor is on.
//!
//! Both run over the owned tree in [`syntax`], built by [`parser`] from the
//! mago PHP parser.  [`query`] ties parsing and resolution together behind
//! a request/response interface used by the `phpcursor` binary.
//!
//! ```
//! use phpcursor::query::{QueryEngine, QueryOutput};
//!
//! let source = "<?php\nfoo(1, bar(2));\n";
//! let offset = source.find("2").unwrap() as u32;
//! let output = QueryEngine::default().invocation(source, offset).unwrap();
//! let QueryOutput::Invocation(call) = output else { panic!() };
//! assert_eq!(call.name.as_deref(), Some("bar"));
//! assert_eq!(call.argument_index, 0);
//! ```

pub mod config;
pub mod errors;
pub mod invocation;
pub mod logging;
pub mod parser;
pub mod query;
pub mod scope_chain;
pub mod syntax;
pub mod util;
pub mod walk;

pub use errors::{ConfigError, ConsistencyError, QueryError};
pub use invocation::{Invocation, InvocationKind, ScanOptions};
pub use parser::{SyntaxTree, parse_php};
pub use query::{QueryEngine, QueryMode, QueryOutput, QueryRequest, Response, SourceInput};
pub use scope_chain::{ScopeChain, ScopeChainItem};
