use svgtree::{roxmltree, Document, Indent, WriteOptions};

fn compact() -> WriteOptions {
    WriteOptions {
        indent: Indent::None,
        ..WriteOptions::default()
    }
}

#[test]
fn import_copies_subtree() {
    let source = Document::parse_str(
        "<svg xmlns='http://www.w3.org/2000/svg' xmlns:xlink='http://www.w3.org/1999/xlink'>
            <symbol id='star' viewBox='0 0 24 24'>
                <path d='M0 0L24 24'/>
                <use xlink:href='#dot'/>
            </symbol>
        </svg>",
    )
    .unwrap();

    let mut doc = Document::new("svg");
    let root = doc.root_element().id();
    let symbol = source.element_by_id("star").unwrap().id();
    let copy = doc.import(&source, symbol);
    assert!(doc.get(copy).parent().is_none());

    doc.append(root, copy);

    let text = doc.to_string(&compact());
    assert!(text.starts_with("<svg "));
    assert!(text.contains("xmlns=\"http://www.w3.org/2000/svg\""));
    assert!(text.contains("xmlns:xlink=\"http://www.w3.org/1999/xlink\""));
    assert!(text.ends_with(
        "<symbol id=\"star\" viewBox=\"0 0 24 24\"><path d=\"M0 0L24 24\"/>\
         <use xlink:href=\"#dot\"/></symbol></svg>"
    ));
    assert_eq!(text.matches("xmlns=").count(), 1);

    // The source is untouched.
    assert_eq!(source.element_by_id("star").unwrap().children().count(), 2);
}

#[test]
fn imported_nodes_are_independent() {
    let source = Document::parse_str(
        "<svg xmlns='http://www.w3.org/2000/svg'><g id='a'><rect width='1' height='1'/></g></svg>",
    )
    .unwrap();

    let mut doc = Document::new("svg");
    let root = doc.root_element().id();
    let copy = doc.import(&source, source.element_by_id("a").unwrap().id());
    doc.append(root, copy);
    doc.set_attribute(copy, "id", "b");

    assert_eq!(source.element_by_id("a").map(|n| n.tag_name()), Some(Some("g")));
    assert!(doc.element_by_id("a").is_none());
    assert!(doc.element_by_id("b").is_some());
}

#[test]
fn parse_and_write_preserves_structure() {
    let text = "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"-20 -20 140 140\">\
                <defs><linearGradient id=\"lg\"/></defs>\
                <g data-element-type=\"shape\"><circle cx=\"5\" cy=\"5\" r=\"5\"/></g></svg>";

    let doc = Document::parse_str(text).unwrap();
    assert_eq!(doc.to_string(&compact()), text);
}

#[test]
fn foreign_content_keeps_its_namespace() {
    let source = Document::parse_str(
        "<svg xmlns='http://www.w3.org/2000/svg'>
            <g id='label'>
                <foreignObject width='10' height='10'>
                    <div xmlns='http://www.w3.org/1999/xhtml'><span>Hi</span></div>
                </foreignObject>
            </g>
        </svg>",
    )
    .unwrap();

    let mut doc = Document::new("svg");
    let root = doc.root_element().id();
    let copy = doc.import(&source, source.element_by_id("label").unwrap().id());
    doc.append(root, copy);

    let text = doc.to_string(&compact());
    assert_eq!(text.matches("xmlns=").count(), 2);

    let xml = roxmltree::Document::parse(&text).unwrap();
    let ns_of = |name: &str| {
        xml.descendants()
            .find(|n| n.has_tag_name(name))
            .and_then(|n| n.tag_name().namespace())
    };

    assert_eq!(ns_of("foreignObject"), Some("http://www.w3.org/2000/svg"));
    assert_eq!(ns_of("div"), Some("http://www.w3.org/1999/xhtml"));
    assert_eq!(ns_of("span"), Some("http://www.w3.org/1999/xhtml"));

    let div = doc.root_element().descendants().find(|n| n.has_tag_name("div")).unwrap();
    assert_eq!(div.namespace(), Some("http://www.w3.org/1999/xhtml"));
    assert_eq!(doc.root_element().namespace(), Some("http://www.w3.org/2000/svg"));
}
