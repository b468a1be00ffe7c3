//! Markup tree for mapper XML documents and its renderer


const INDENT: &str = "  ";

#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    /// Character data; escaped on render
    Text(String),
    /// Pre-rendered markup copied verbatim, e.g. a fragment kept from an existing file
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Builder-style text child
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Builder-style element child
    pub fn child(mut self, element: XmlElement) -> Self {
        self.children.push(XmlNode::Element(element));
        self
    }

    pub fn push(&mut self, element: XmlElement) {
        self.children.push(XmlNode::Element(element));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(XmlNode::Text(text.into()));
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Direct child element carrying `id`
    pub fn element_by_id(&self, id: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.id() == Some(id))
    }

    fn render(&self, depth: usize, out: &mut String) {
        let indent = INDENT.repeat(depth);
        out.push_str(&format!("{}<{}", indent, self.name));
        for (name, value) in &self.attributes {
            out.push_str(&format!(" {}=\"{}\"", name, escape(value, true)));
        }
        if self.children.is_empty() {
            out.push_str(" />");
            return;
        }
        out.push('>');
        for child in &self.children {
            out.push('\n');
            render_node(child, depth + 1, out);
        }
        out.push_str(&format!("\n{}</{}>", indent, self.name));
    }
}

fn render_node(node: &XmlNode, depth: usize, out: &mut String) {
    match node {
        XmlNode::Element(e) => e.render(depth, out),
        XmlNode::Text(t) => {
            out.push_str(&format!("{}{}", INDENT.repeat(depth), escape(t, false)));
        }
        XmlNode::Raw(r) => {
            out.push_str(&format!("{}{}", INDENT.repeat(depth), r));
        }
    }
}

/// A complete XML document with an optional DOCTYPE
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    pub public_id: Option<String>,
    pub system_id: Option<String>,
    pub root: XmlElement,
}

impl XmlDocument {
    pub fn new(root: XmlElement) -> Self {
        Self {
            public_id: None,
            system_id: None,
            root,
        }
    }

    /// Root children are separated by a blank line
    pub fn render(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        if let (Some(public_id), Some(system_id)) = (&self.public_id, &self.system_id) {
            out.push_str(&format!(
                "<!DOCTYPE {} PUBLIC \"{}\" \"{}\">\n",
                self.root.name, public_id, system_id
            ));
        }

        let root = &self.root;
        out.push_str(&format!("<{}", root.name));
        for (name, value) in &root.attributes {
            out.push_str(&format!(" {}=\"{}\"", name, escape(value, true)));
        }
        if root.children.is_empty() {
            out.push_str(" />\n");
            return out;
        }
        out.push_str(">\n");
        for (i, child) in root.children.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            render_node(child, 1, &mut out);
            out.push('\n');
        }
        out.push_str(&format!("</{}>\n", root.name));
        out
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
