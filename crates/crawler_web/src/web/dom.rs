use crawler_client::{ClientError, Dom, Handler};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub(super) struct WebDom {
    document: web_sys::Document,
}

impl WebDom {
    pub(super) fn new() -> Result<Self, ClientError> {
        let document = web_sys::window()
            .ok_or_else(|| ClientError::Dom("no window".to_string()))?
            .document()
            .ok_or_else(|| ClientError::Dom("no document".to_string()))?;
        Ok(Self { document })
    }
}

fn dom_err(what: &str) -> impl Fn(JsValue) -> ClientError + '_ {
    move |e| ClientError::Dom(format!("{what}: {e:?}"))
}

impl Dom for WebDom {
    type Node = web_sys::Element;

    fn by_id(&self, id: &str) -> Option<web_sys::Element> {
        self.document.get_element_by_id(id)
    }

    fn create_element(&self, tag: &str) -> Result<web_sys::Element, ClientError> {
        self.document.create_element(tag).map_err(dom_err("create_element"))
    }

    fn set_attribute(
        &self,
        node: &web_sys::Element,
        name: &str,
        value: &str,
    ) -> Result<(), ClientError> {
        node.set_attribute(name, value).map_err(dom_err("set_attribute"))
    }

    fn set_property(
        &self,
        node: &web_sys::Element,
        name: &str,
        value: &str,
    ) -> Result<(), ClientError> {
        js_sys::Reflect::set(node, &JsValue::from_str(name), &JsValue::from_str(value))
            .map_err(dom_err("set_property"))?;
        Ok(())
    }

    fn bind_handler(
        &self,
        node: &web_sys::Element,
        property: &str,
        handler: Handler,
    ) -> Result<(), ClientError> {
        // Property assignment, not addEventListener: rebinding replaces.
        let f = Closure::<dyn Fn()>::new(move || handler()).into_js_value();
        js_sys::Reflect::set(node, &JsValue::from_str(property), &f)
            .map_err(dom_err("bind_handler"))?;
        Ok(())
    }

    fn append_text(&self, parent: &web_sys::Element, text: &str) -> Result<(), ClientError> {
        let t = self.document.create_text_node(text);
        parent.append_child(&t).map_err(dom_err("append_text"))?;
        Ok(())
    }

    fn append_child(
        &self,
        parent: &web_sys::Element,
        child: &web_sys::Element,
    ) -> Result<(), ClientError> {
        parent.append_child(child).map_err(dom_err("append_child"))?;
        Ok(())
    }

    fn remove_children(&self, node: &web_sys::Element) -> Result<(), ClientError> {
        while let Some(child) = node.first_child() {
            node.remove_child(&child).map_err(dom_err("remove_child"))?;
        }
        Ok(())
    }

    fn value(&self, node: &web_sys::Element) -> String {
        if let Some(input) = node.dyn_ref::<web_sys::HtmlInputElement>() {
            return input.value();
        }
        js_sys::Reflect::get(node, &JsValue::from_str("value"))
            .ok()
            .and_then(|v| v.as_string())
            .unwrap_or_default()
    }
}
