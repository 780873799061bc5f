//! HTML serialization (`innerHTML` / `outerHTML`)

use crate::{DomTree, NodeData, NodeId};

/// Elements that never have children or an end tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta",
    "source", "track", "wbr",
];

/// Elements whose text children are emitted without escaping
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

impl DomTree {
    /// Serialize the children of a node
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.child_ids(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    /// Serialize a node including itself
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.get(id) else { return };
        match &node.data {
            NodeData::Document => {
                for child in self.child_ids(id) {
                    self.write_node(child, out);
                }
            }
            NodeData::Doctype { name } => {
                out.push_str("<!DOCTYPE ");
                out.push_str(name);
                out.push('>');
            }
            NodeData::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeData::Text(text) => {
                let raw = self
                    .parent(id)
                    .and_then(|p| self.tag_name(p))
                    .is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag));
                if raw {
                    out.push_str(text);
                } else {
                    out.push_str(&html_escape::encode_text(text));
                }
            }
            NodeData::Element(elem) => {
                out.push('<');
                out.push_str(&elem.tag);
                for attr in elem.attrs.iter() {
                    out.push(' ');
                    out.push_str(&attr.name);
                    out.push_str("=\"");
                    out.push_str(&html_escape::encode_double_quoted_attribute(&attr.value));
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&elem.tag.as_str()) {
                    return;
                }
                for child in self.child_ids(id) {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(&elem.tag);
                out.push('>');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::DomTree;

    #[test]
    fn test_serialize_nested() {
        let mut tree = DomTree::new();
        let li = tree.create_element("li");
        tree.set_attribute(li, "id", "el-id").unwrap();
        let word1 = tree.create_text("word1 ");
        let span = tree.create_element("span");
        let word2 = tree.create_text("word2");
        tree.append_child(li, word1).unwrap();
        tree.append_child(li, span).unwrap();
        tree.append_child(span, word2).unwrap();

        assert_eq!(tree.inner_html(li), "word1 <span>word2</span>");
        assert_eq!(tree.outer_html(li), "<li id=\"el-id\">word1 <span>word2</span></li>");
    }

    #[test]
    fn test_serialize_escapes_text_and_attributes() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        tree.set_attribute(div, "title", "a \"b\"").unwrap();
        tree.set_text_content(div, "<div>New Content</div>").unwrap();

        assert_eq!(tree.inner_html(div), "&lt;div&gt;New Content&lt;/div&gt;");
        assert!(tree.outer_html(div).starts_with("<div title=\"a &quot;b&quot;\">"));
    }

    #[test]
    fn test_void_elements_have_no_end_tag() {
        let mut tree = DomTree::new();
        let p = tree.create_element("p");
        let br = tree.create_element("br");
        tree.append_child(p, br).unwrap();
        assert_eq!(tree.inner_html(p), "<br>");
    }
}
