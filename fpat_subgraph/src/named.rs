//! Name-based access to a finished match.

use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexMap;

use crate::{MatchContext, MatchError};

/// Resolves the names given to pattern nodes while the pattern was built to
/// the object nodes they matched.
#[derive(Debug)]
pub struct NamedMatch<'m, P, O> {
    ctx: &'m MatchContext<P, O>,
    names: &'m IndexMap<String, P>,
}

impl<'m, P, O> NamedMatch<'m, P, O>
where
    P: Clone + Eq + Hash + Debug,
    O: Clone + Eq + Hash + Debug,
{
    /// Pairs a match with the pattern's name table.
    pub const fn new(ctx: &'m MatchContext<P, O>, names: &'m IndexMap<String, P>) -> Self {
        Self { ctx, names }
    }

    /// Object node bound to the pattern node called `name`.
    ///
    /// # Errors
    /// - [`MatchError::UnknownName`] if the pattern declares no such name.
    /// - [`MatchError::Unresolved`] if the node is not uniquely matched.
    pub fn get(&self, name: &str) -> Result<&'m O, MatchError> {
        let ptn = self
            .names
            .get(name)
            .ok_or_else(|| MatchError::UnknownName(name.to_owned()))?;
        self.ctx.bound_object(ptn).ok_or_else(|| MatchError::Unresolved {
            name: name.to_owned(),
            candidates: self.ctx.candidates(ptn).map_or(0, |set| set.len()),
        })
    }

    /// Every uniquely matched name, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'m str, &'m O)> {
        let (ctx, names) = (self.ctx, self.names);
        names
            .iter()
            .filter_map(move |(name, ptn)| ctx.bound_object(ptn).map(|obj| (name.as_str(), obj)))
    }
}

#[cfg(test)]
mod tests {
    use indexmap::{IndexMap, indexset};

    use super::*;

    #[test]
    fn names_resolve_to_bound_objects() {
        let mut ctx: MatchContext<u8, u32> = MatchContext::new();
        ctx.init(0, indexset! {40}).unwrap();
        ctx.init(1, indexset! {41, 42}).unwrap();
        let names: IndexMap<String, u8> =
            [("op".to_owned(), 0), ("out".to_owned(), 1), ("ghost".to_owned(), 9)]
                .into_iter()
                .collect();

        let named = NamedMatch::new(&ctx, &names);
        assert_eq!(named.get("op").unwrap(), &40);
        assert_eq!(
            named.get("out").unwrap_err(),
            MatchError::Unresolved {
                name: "out".into(),
                candidates: 2
            }
        );
        assert_eq!(
            named.get("ghost").unwrap_err(),
            MatchError::Unresolved {
                name: "ghost".into(),
                candidates: 0
            }
        );
        assert_eq!(
            named.get("nope").unwrap_err(),
            MatchError::UnknownName("nope".into())
        );
        assert_eq!(named.iter().collect::<Vec<_>>(), vec![("op", &40)]);
    }
}
