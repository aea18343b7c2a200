use bodega::{PathDecoder, PathStep, XmlNode, XmlReader, XmlTag, XmlWriter};
use proptest::prelude::*;

fn write_document(nodes: &[XmlNode<'_>]) -> String {
    let mut writer = XmlWriter::new();
    for node in nodes {
        writer.write(node.clone()).unwrap();
    }
    writer.into_document()
}

fn read_document(doc: &str) -> Vec<XmlNode<'_>> {
    let mut reader = XmlReader::new(doc.as_bytes());
    let mut nodes = Vec::new();
    loop {
        let node = reader.read().unwrap();
        let end = node == XmlNode::End;
        nodes.push(node);
        if end {
            return nodes;
        }
    }
}

#[test]
fn two_field_document_roundtrips_node_for_node() {
    let nodes = vec![
        XmlNode::start("Root"),
        XmlNode::start("A"),
        XmlNode::text("1"),
        XmlNode::EndTag,
        XmlNode::start("B"),
        XmlNode::text("2"),
        XmlNode::EndTag,
        XmlNode::EndTag,
        XmlNode::End,
    ];
    let doc = write_document(&nodes);
    assert_eq!(doc, "<Root><A>1</A><B>2</B></Root>");
    assert_eq!(read_document(&doc), nodes);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RootTag {
    Root,
    A,
    B,
    Unknown,
}

impl XmlTag for RootTag {
    const UNKNOWN: Self = RootTag::Unknown;

    fn from_name(name: &str) -> Self {
        match name {
            "Root" => RootTag::Root,
            "A" => RootTag::A,
            "B" => RootTag::B,
            _ => RootTag::Unknown,
        }
    }
}

#[test]
fn path_decoder_captures_both_fields_from_the_roundtripped_bytes() {
    let doc = write_document(&[
        XmlNode::start("Root"),
        XmlNode::start("A"),
        XmlNode::text("1"),
        XmlNode::EndTag,
        XmlNode::start("B"),
        XmlNode::text("2"),
        XmlNode::EndTag,
        XmlNode::EndTag,
        XmlNode::End,
    ]);

    let mut reader = XmlReader::new(doc.as_bytes());
    let mut decoder = PathDecoder::<RootTag>::new(&mut reader);
    let mut a = None;
    let mut b = None;
    while let Some(step) = decoder.next().unwrap() {
        match step {
            PathStep::Text(value) if decoder.matches(&[RootTag::Root, RootTag::A]) => {
                a = Some(value.into_owned());
            }
            PathStep::Text(value) if decoder.matches(&[RootTag::Root, RootTag::B]) => {
                b = Some(value.into_owned());
            }
            _ => {}
        }
    }
    assert_eq!(a.as_deref(), Some("1"));
    assert_eq!(b.as_deref(), Some("2"));
}

#[test]
fn escaped_content_roundtrips() {
    let nodes = vec![
        XmlNode::start("Root"),
        XmlNode::attribute("q", r#"a="1"&b='2'"#),
        XmlNode::text("5 < 6 > 4 & \"done\""),
        XmlNode::EndTag,
        XmlNode::End,
    ];
    let doc = write_document(&nodes);
    assert_eq!(read_document(&doc), nodes);
}

// Model documents for the generative round-trip: a tree whose node
// sequence never contains two adjacent text nodes, since the reader
// coalesces each contiguous character-data run into one node.
#[derive(Debug, Clone)]
enum Child {
    Text(String),
    Element(Element),
}

#[derive(Debug, Clone)]
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Child>,
}

fn push_nodes<'a>(element: &'a Element, out: &mut Vec<XmlNode<'a>>) {
    out.push(XmlNode::start(&element.name));
    for (name, value) in &element.attrs {
        out.push(XmlNode::attribute(name, value));
    }
    for child in &element.children {
        match child {
            Child::Text(text) => out.push(XmlNode::text(text)),
            Child::Element(inner) => push_nodes(inner, out),
        }
    }
    out.push(XmlNode::EndTag);
}

fn merge_adjacent_text(children: Vec<Child>) -> Vec<Child> {
    let mut merged: Vec<Child> = Vec::new();
    for child in children {
        match (merged.last_mut(), child) {
            (Some(Child::Text(acc)), Child::Text(next)) => acc.push_str(&next),
            (_, child) => merged.push(child),
        }
    }
    merged
}

fn name_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9]{0,7}"
}

fn text_strategy() -> impl Strategy<Value = String> {
    r#"[a-zA-Z0-9&<>"' ]{1,16}"#
}

fn element_strategy() -> impl Strategy<Value = Element> {
    let leaf = (
        name_strategy(),
        prop::collection::vec((name_strategy(), text_strategy()), 0..3),
    )
        .prop_map(|(name, attrs)| Element {
            name,
            attrs,
            children: Vec::new(),
        });
    leaf.prop_recursive(3, 24, 4, |inner| {
        (
            name_strategy(),
            prop::collection::vec((name_strategy(), text_strategy()), 0..3),
            prop::collection::vec(
                prop_oneof![
                    text_strategy().prop_map(Child::Text),
                    inner.prop_map(Child::Element),
                ],
                0..4,
            ),
        )
            .prop_map(|(name, attrs, children)| Element {
                name,
                attrs,
                children: merge_adjacent_text(children),
            })
    })
}

proptest! {
    #[test]
    fn any_balanced_document_roundtrips(root in element_strategy()) {
        let mut nodes = Vec::new();
        push_nodes(&root, &mut nodes);
        nodes.push(XmlNode::End);

        let doc = write_document(&nodes);
        prop_assert_eq!(read_document(&doc), nodes);
    }
}
