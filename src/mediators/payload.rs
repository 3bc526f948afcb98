//! Payload factory: replaces the body with a templated document.
//!
//! `$1`, `$2`, ... in text and attribute values are replaced with the
//! rendered arguments. Unknown placeholders are left as written.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::value::ValueExpr;
use super::Mediator;
use crate::core::body::{parse_xml, Element, Node};
use crate::core::message_context::MessageContext;
use crate::core::runtime_context::RuntimeContext;
use crate::error::MediatorError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PayloadConfig {
    pub xml: String,
    #[serde(default)]
    pub args: Vec<ValueExpr>,
}

pub struct PayloadMediator {
    template: Element,
    args: Vec<ValueExpr>,
}

impl PayloadMediator {
    pub fn new(config: PayloadConfig) -> Result<Self, MediatorError> {
        let template = parse_xml(&config.xml)
            .map_err(|e| MediatorError::ConfigError(format!("invalid payload: {}", e)))?;
        for arg in &config.args {
            arg.validate()?;
        }
        Ok(Self {
            template,
            args: config.args,
        })
    }
}

#[async_trait]
impl Mediator for PayloadMediator {
    fn kind(&self) -> &'static str {
        "payload"
    }

    async fn mediate(
        &self,
        ctx: &mut MessageContext,
        _runtime: &RuntimeContext,
    ) -> Result<(), MediatorError> {
        let payload = if self.args.is_empty() {
            self.template.clone()
        } else {
            let values = self
                .args
                .iter()
                .map(|arg| arg.evaluate_string(ctx))
                .collect::<Result<Vec<_>, _>>()?;
            let mut payload = self.template.clone();
            fill(&mut payload, &values);
            payload
        };
        ctx.replace_body(Some(payload));
        Ok(())
    }
}

fn fill(element: &mut Element, values: &[String]) {
    for (_, value) in element.attributes.iter_mut() {
        *value = substitute(value, values);
    }
    for child in element.children.iter_mut() {
        match child {
            Node::Element(e) => fill(e, values),
            Node::Text(t) => *t = substitute(t, values),
        }
    }
}

fn substitute(template: &str, values: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let digits = after.chars().take_while(|c| c.is_ascii_digit()).count();
        let value = after[..digits]
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| values.get(i));
        match value {
            Some(value) => out.push_str(value),
            None => {
                out.push('$');
                out.push_str(&after[..digits]);
            }
        }
        rest = &after[digits..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::property_store::PropertyScope;
    use crate::scope::NamingPolicy;

    #[tokio::test]
    async fn test_payload_replaces_body() {
        let mut ctx =
            MessageContext::from_parts("t", Some(Element::new("old")), NamingPolicy::default());
        PayloadMediator::new(PayloadConfig {
            xml: "<new><x>1</x></new>".into(),
            args: Vec::new(),
        })
        .unwrap()
        .mediate(&mut ctx, &RuntimeContext::default())
        .await
        .unwrap();
        assert_eq!(ctx.body().unwrap().to_xml(), "<new><x>1</x></new>");
    }

    #[tokio::test]
    async fn test_payload_arguments() {
        let body = parse_xml("<m0:request><m0:code>IBM</m0:code></m0:request>").unwrap();
        let mut ctx = MessageContext::from_parts("t", Some(body), NamingPolicy::default());
        ctx.set_property(PropertyScope::Message, "group", "Group1")
            .unwrap();
        PayloadMediator::new(PayloadConfig {
            xml: r#"<m0:symbol at="$2">$1_$2 $3</m0:symbol>"#.into(),
            args: vec![
                ValueExpr::property("group", PropertyScope::Message),
                ValueExpr::Path("//m0:code".into()),
            ],
        })
        .unwrap()
        .mediate(&mut ctx, &RuntimeContext::default())
        .await
        .unwrap();
        assert_eq!(
            ctx.body().unwrap().to_xml(),
            r#"<m0:symbol at="IBM">Group1_IBM $3</m0:symbol>"#
        );
    }

    #[test]
    fn test_substitute_edge_cases() {
        let values = vec!["a".to_string()];
        assert_eq!(substitute("$", &values), "$");
        assert_eq!(substitute("$0 $1$1 $x", &values), "$0 aa $x");
        assert_eq!(substitute("cost: $10", &values), "cost: $10");
    }

    #[test]
    fn test_invalid_payload() {
        assert!(matches!(
            PayloadMediator::new(PayloadConfig {
                xml: "<a>".into(),
                args: Vec::new(),
            }),
            Err(MediatorError::ConfigError(_))
        ));
    }
}
