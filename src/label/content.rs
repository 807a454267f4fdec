use crate::view::ViewNode;

/// Pending label markup and what was last written to the container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentCache {
    content: Option<String>,
    rendered: Option<String>,
    width: Option<f64>,
}

impl ContentCache {
    pub fn set(&mut self, content: impl Into<String>) {
        self.content = Some(content.into());
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    #[cfg(test)]
    pub(crate) fn rendered(&self) -> Option<&str> {
        self.rendered.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.content.is_some() && self.content != self.rendered
    }

    /// Width measured for the rendered content, only while it is still current.
    pub fn width(&self) -> Option<f64> {
        if self.is_dirty() { None } else { self.width }
    }

    /// Write pending content into `node` and re-measure it. Returns whether
    /// anything was rendered.
    pub fn render_if_changed<N: ViewNode>(&mut self, node: &N) -> bool {
        if !self.is_dirty() {
            return false;
        }
        let Some(content) = self.content.as_deref() else {
            return false;
        };
        node.set_html(content);
        self.rendered = self.content.clone();
        self.width = Some(node.offset_width());
        true
    }
}
