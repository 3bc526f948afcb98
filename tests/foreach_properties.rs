//! End-to-end foreach behaviour driven through YAML pipelines.

use std::sync::Arc;

use xmediation::core::FakeIdGenerator;
use xmediation::{
    parse_dsl, DslFormat, Element, EngineConfig, MediationError, MediatorError, MessageContext,
    NamingPolicy, PipelineRunner, PropertyScope, PropertyValue,
};

const QUOTE_REQUEST: &str = include_str!("../demos/quote_request.xml");
const QUOTE_PIPELINE: &str = include_str!("../demos/quote_pipeline.yaml");

const SINGLE: &str = r#"
pipeline:
  - type: foreach
    expression: "//m0:getQuote/m0:request"
    group:
      path: "//m0:getQuote/m0:group"
    sequence:
      - type: property
        name: fe_group
        scope: construct
        value: { property: { name: group, scope: iteration } }
      - type: payload
        xml: "<m0:symbol>$1</m0:symbol>"
        args:
          - concat:
              - property: { name: group, scope: iteration }
              - literal: "_"
              - path: "//m0:code"
"#;

fn runner(yaml: &str) -> PipelineRunner {
    let schema = parse_dsl(yaml, DslFormat::Yaml).unwrap();
    PipelineRunner::builder(schema)
        .id_generator(Arc::new(FakeIdGenerator::new("it".into())))
        .build()
        .unwrap()
}

fn message(ctx: &MessageContext, key: &str) -> Option<PropertyValue> {
    ctx.get_property(PropertyScope::Message, key).cloned()
}

fn texts(body: &Element, name: &str) -> Vec<String> {
    body.child_elements()
        .filter(|(_, e)| e.name == name)
        .map(|(_, e)| e.text())
        .collect()
}

#[tokio::test]
async fn test_single_foreach_properties() {
    let ctx = runner(SINGLE).run_xml(QUOTE_REQUEST).await.unwrap();
    let body = ctx.body().unwrap();

    assert_eq!(body.name, "m0:getQuote");
    assert_eq!(texts(body, "m0:group"), vec!["Group1"]);
    assert_eq!(
        texts(body, "m0:symbol"),
        vec!["Group1_IBM", "Group1_WSO2", "Group1_MSFT"]
    );

    assert_eq!(message(&ctx, "1_count"), Some(PropertyValue::Integer(3)));
    assert_eq!(message(&ctx, "1_group"), Some(PropertyValue::from("Group1")));
    assert_eq!(message(&ctx, "1_fe_group"), Some(PropertyValue::from("Group1")));

    let original = message(&ctx, "1_original_payload").unwrap();
    let original = original.as_element().unwrap();
    assert_eq!(
        original
            .child_elements()
            .filter(|(_, e)| e.name == "m0:request")
            .count(),
        3
    );
}

#[tokio::test]
async fn test_multiple_foreach_without_id() {
    let ctx = runner(QUOTE_PIPELINE).run_xml(QUOTE_REQUEST).await.unwrap();
    let body = ctx.body().unwrap();

    assert_eq!(body.name, "m0:checkPrice");
    assert_eq!(texts(body, "m0:group"), vec!["Group2"]);
    assert_eq!(
        texts(body, "m0:symbol"),
        vec![
            "Group1_Group2_IBM",
            "Group1_Group2_WSO2",
            "Group1_Group2_MSFT",
            "Group1_Group2_SUN"
        ]
    );

    assert_eq!(message(&ctx, "1_count"), Some(PropertyValue::Integer(3)));
    assert_eq!(message(&ctx, "1_group"), Some(PropertyValue::from("Group1")));
    assert_eq!(message(&ctx, "2_count"), Some(PropertyValue::Integer(4)));
    assert_eq!(message(&ctx, "2_group"), Some(PropertyValue::from("Group2")));

    let second_original = message(&ctx, "2_original_payload").unwrap();
    let codes: Vec<String> = second_original
        .as_element()
        .unwrap()
        .child_elements()
        .filter_map(|(_, e)| e.at_path(&[0]).map(|c| c.text()))
        .filter(|t| !t.is_empty())
        .collect();
    assert_eq!(codes, vec!["IBM", "WSO2", "MSFT", "SUN"]);
}

#[tokio::test]
async fn test_multiple_foreach_with_id() {
    let yaml = r#"
pipeline:
  - type: foreach
    id: quotes
    expression: "//m0:request"
    group: { path: "//m0:group" }
    sequence: []
  - type: foreach
    expression: "//m0:request"
    sequence: []
  - type: foreach
    id: quotes
    expression: "//m0:code"
    sequence: []
"#;
    let ctx = runner(yaml).run_xml(QUOTE_REQUEST).await.unwrap();

    // The id-less construct is the second started.
    assert_eq!(message(&ctx, "2_count"), Some(PropertyValue::Integer(3)));
    assert!(message(&ctx, "1_count").is_none());
    // Same id twice: same prefix, last run wins.
    assert_eq!(message(&ctx, "quotes_count"), Some(PropertyValue::Integer(3)));
    assert_eq!(message(&ctx, "quotes_group"), Some(PropertyValue::from("Group1")));
}

#[tokio::test]
async fn test_empty_selection_promotes_zero() {
    let yaml = r#"
pipeline:
  - type: foreach
    expression: "//m0:missing"
    sequence:
      - type: fail
        message: never runs
"#;
    let ctx = runner(yaml).run_xml(QUOTE_REQUEST).await.unwrap();
    assert_eq!(message(&ctx, "1_count"), Some(PropertyValue::Integer(0)));
    assert_eq!(texts(ctx.body().unwrap(), "m0:group"), vec!["Group1"]);
}

#[tokio::test]
async fn test_fault_in_second_fragment() {
    let yaml = r#"
pipeline:
  - type: property
    name: before
    value: { literal: "set" }
  - type: foreach
    expression: "//m0:request"
    sequence:
      - type: fail
        message: unsupported symbol
        when:
          value: { path: "//m0:code" }
          equals: WSO2
  - type: property
    name: after
    value: { literal: "set" }
"#;
    let runner = runner(yaml);
    let mut ctx = runner.new_context(xmediation::parse_payload(QUOTE_REQUEST).unwrap());
    let original = ctx.body().cloned();

    let err = runner.run_with_context(&mut ctx).await.unwrap_err();
    let fault = match &err {
        MediationError::MediatorError(inner) => inner,
        other => panic!("unexpected error: {}", other),
    };
    assert_eq!(fault.failed_index(), Some(1));
    assert!(matches!(fault.root_cause(), MediatorError::Fault(m) if m == "unsupported symbol"));

    assert_eq!(ctx.body().cloned(), original);
    assert_eq!(message(&ctx, "before"), Some(PropertyValue::from("set")));
    assert!(message(&ctx, "after").is_none());
    assert!(message(&ctx, "1_count").is_none());
    assert_eq!(ctx.construct_depth(), 0);
}

#[tokio::test]
async fn test_unknown_named_sequence_is_configuration_fault() {
    let yaml = r#"
pipeline:
  - type: foreach
    expression: "//m0:request"
    sequence: nowhere
"#;
    let err = runner(yaml).run_xml(QUOTE_REQUEST).await.unwrap_err();
    let fault = err.as_mediator_error().unwrap();
    assert!(fault.is_configuration_fault());
    assert!(fault.failed_index().is_none());
}

#[tokio::test]
async fn test_per_definition_site_policy() {
    let yaml = r#"
sequences:
  inner:
    - type: foreach
      expression: "/m0:request/m0:code"
      sequence: []
pipeline:
  - type: foreach
    expression: "//m0:request"
    sequence: inner
"#;
    let per_invocation = runner(yaml).run_xml(QUOTE_REQUEST).await.unwrap();
    for key in ["2_count", "3_count", "4_count"] {
        assert_eq!(
            message(&per_invocation, key),
            Some(PropertyValue::Integer(1)),
            "{}",
            key
        );
    }

    let schema = parse_dsl(yaml, DslFormat::Yaml).unwrap();
    let runner = PipelineRunner::builder(schema)
        .config(EngineConfig {
            naming_policy: NamingPolicy::PerDefinitionSite,
        })
        .build()
        .unwrap();
    let per_site = runner.run_xml(QUOTE_REQUEST).await.unwrap();
    assert_eq!(message(&per_site, "1_count"), Some(PropertyValue::Integer(3)));
    assert_eq!(message(&per_site, "2_count"), Some(PropertyValue::Integer(1)));
    assert!(message(&per_site, "3_count").is_none());
}

#[tokio::test]
async fn test_concurrent_messages_have_independent_naming() {
    let runner = Arc::new(runner(SINGLE));
    let mut handles = Vec::new();
    for _ in 0..8 {
        let runner = runner.clone();
        handles.push(tokio::spawn(async move {
            runner.run_xml(QUOTE_REQUEST).await.unwrap()
        }));
    }
    for handle in handles {
        let ctx = handle.await.unwrap();
        assert_eq!(message(&ctx, "1_count"), Some(PropertyValue::Integer(3)));
        assert!(message(&ctx, "2_count").is_none());
    }
}
