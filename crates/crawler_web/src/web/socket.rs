use std::cell::RefCell;
use std::rc::Rc;

use crawler_client::{ClientError, LogSocket, SocketEvent};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub(super) struct WebLogSocket;

type Listener = Rc<RefCell<Box<dyn FnMut(SocketEvent<JsValue>)>>>;

fn dispatch(listener: &Listener, event: SocketEvent<JsValue>) {
    match listener.try_borrow_mut() {
        Ok(mut l) => (*l)(event),
        Err(_) => tracing::warn!("dropped re-entrant live-log event"),
    }
}

fn payload_text(data: JsValue) -> String {
    match data.as_string() {
        Some(s) => s,
        None => String::from(js_sys::Object::from(data).to_string()),
    }
}

impl LogSocket for WebLogSocket {
    type Error = JsValue;
    type Connection = web_sys::WebSocket;

    fn open(
        &self,
        url: &str,
        listener: Box<dyn FnMut(SocketEvent<JsValue>)>,
    ) -> Result<web_sys::WebSocket, ClientError> {
        let ws = web_sys::WebSocket::new(url)
            .map_err(|e| ClientError::Socket(format!("{url}: {e:?}")))?;
        let listener: Listener = Rc::new(RefCell::new(listener));

        let l = listener.clone();
        let onmessage =
            Closure::<dyn FnMut(web_sys::MessageEvent)>::new(move |e: web_sys::MessageEvent| {
                dispatch(&l, SocketEvent::Message(payload_text(e.data())));
            });
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        onmessage.forget();

        let l = listener.clone();
        let onopen = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
            dispatch(&l, SocketEvent::Opened);
        });
        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        onopen.forget();

        let l = listener.clone();
        let onclose = Closure::<dyn FnMut(web_sys::CloseEvent)>::new(move |_: web_sys::CloseEvent| {
            dispatch(&l, SocketEvent::Closed);
        });
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));
        onclose.forget();

        let l = listener;
        let onerror = Closure::<dyn FnMut(web_sys::Event)>::new(move |e: web_sys::Event| {
            dispatch(&l, SocketEvent::Error(e.into()));
        });
        ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();

        Ok(ws)
    }
}
