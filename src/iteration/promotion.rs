use crate::core::message_context::MessageContext;
use crate::core::property_store::{PropertyScope, PropertyStore};
use crate::error::MediatorError;
use crate::scope::ResolvedName;

/// Copy every construct-scope property into message scope as
/// `<name>_<key>`. Existing message-scope keys are overwritten.
pub fn promote(
    ctx: &mut MessageContext,
    name: &ResolvedName,
    construct: &PropertyStore,
) -> Result<usize, MediatorError> {
    for (key, value) in construct.iter() {
        ctx.set_property(PropertyScope::Message, name.property_key(key), value.clone())?;
    }
    tracing::trace!(construct = %name, promoted = construct.len(), "construct scope promoted");
    Ok(construct.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::property_store::PropertyValue;
    use crate::scope::NamingPolicy;

    #[test]
    fn test_promote_prefixes_keys() {
        let mut ctx = MessageContext::from_parts("t", None, NamingPolicy::default());
        ctx.set_property(PropertyScope::Message, "2_count", 9i64)
            .unwrap();
        let mut store = PropertyStore::new();
        store.set("count", 3i64);
        store.set("group", "Group1");

        let promoted = promote(&mut ctx, &ResolvedName::new("2"), &store).unwrap();
        assert_eq!(promoted, 2);
        assert_eq!(
            ctx.get_property(PropertyScope::Message, "2_count"),
            Some(&PropertyValue::Integer(3))
        );
        assert_eq!(
            ctx.get_property(PropertyScope::Message, "2_group"),
            Some(&PropertyValue::from("Group1"))
        );
        assert!(ctx.get_property(PropertyScope::Message, "count").is_none());
    }
}
