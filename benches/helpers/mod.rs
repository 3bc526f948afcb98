use std::sync::Arc;

use tokio::runtime::Runtime;

use xmediation::core::FakeIdGenerator;
use xmediation::{parse_xml, DslFormat, Element, PipelineRunner};

pub fn bench_runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build runtime")
}

/// `<m0:getQuote>` with a group and `items` requests.
pub fn build_quote(items: usize) -> Element {
    let mut xml = String::from("<m0:getQuote><m0:group>Group1</m0:group>");
    for i in 0..items {
        xml.push_str(&format!(
            "<m0:request><m0:code>SYM{}</m0:code></m0:request>",
            i
        ));
    }
    xml.push_str("</m0:getQuote>");
    parse_xml(&xml).expect("bench payload")
}

/// One foreach over every request; `nested` adds an inner foreach per
/// request over its code element.
pub fn build_foreach_runner(nested: bool) -> PipelineRunner {
    let inner = if nested {
        r#"
      - type: foreach
        expression: "/m0:request/m0:code"
        sequence:
          - type: property
            name: last
            value: { path: "/m0:code" }"#
    } else {
        ""
    };
    let yaml = format!(
        r#"
pipeline:
  - type: foreach
    expression: "//m0:getQuote/m0:request"
    group:
      path: "//m0:group"
    sequence:
      - type: payload
        xml: "<m0:request><m0:code>$1</m0:code></m0:request>"
        args:
          - concat:
              - property: {{ name: group, scope: iteration }}
              - literal: "_"
              - path: "//m0:code"{}
"#,
        inner
    );
    let schema = xmediation::parse_dsl(&yaml, DslFormat::Yaml).expect("bench pipeline");
    PipelineRunner::builder(schema)
        .id_generator(Arc::new(FakeIdGenerator::new("bench".into())))
        .build()
        .expect("bench runner")
}
