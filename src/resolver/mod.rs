// Mon Oct 19 2026 - Alex

pub mod declarator;
pub mod resolver;

pub use declarator::{BaseDecl, Declaration, Declarator, EnumDecl, ForwardTag, MemberDecl, RecordDecl, SourceUnit};
pub use resolver::{resolve_declarations, DeclarationResolver, ResolveOutcome};
