use crate::diagnostics::CompileError;
use crate::ir::ReferenceNode;
use crate::naming::Role;
use super::Lowerer;

/// A pointer resolved to its output identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub identifier: String,
    /// Shares a cyclic group with the schema being lowered; must be deferred.
    pub self_referential: bool,
}

impl Lowerer<'_> {
    pub fn resolve(&self, r: &ReferenceNode) -> Result<Resolved, CompileError> {
        if !self.registry.contains_key(r.pointer.as_str()) {
            return Err(CompileError::UnresolvedReference {
                schema: self.schema.to_string(),
                pointer: r.pointer.clone(),
            });
        }
        Ok(Resolved {
            identifier: self.config.naming.identifier(&r.pointer, Role::Schema),
            self_referential: self.graph.is_self_referential(self.schema, &r.pointer),
        })
    }

    pub(super) fn lower_reference(&mut self, r: &ReferenceNode) -> Result<String, CompileError> {
        let resolved = self.resolve(r)?;
        if resolved.self_referential {
            Ok(format!("z.lazy(() => {})", resolved.identifier))
        } else {
            Ok(resolved.identifier)
        }
    }
}
