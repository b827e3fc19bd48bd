use crawler_client::{
    deliver_on_success, ClientError, Transport, TriggerRequest, TRIGGER_METHOD,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// XMLHttpRequest sender. No timeout, no error listener.
pub(super) struct XhrTransport;

impl Transport for XhrTransport {
    type Response = JsValue;
    type Handle = web_sys::XmlHttpRequest;

    fn send(
        &self,
        request: TriggerRequest,
        on_success: Box<dyn FnOnce(JsValue)>,
    ) -> Result<web_sys::XmlHttpRequest, ClientError> {
        let xhr = web_sys::XmlHttpRequest::new()
            .map_err(|e| ClientError::Transport(format!("XmlHttpRequest::new: {e:?}")))?;
        xhr.open_with_async(TRIGGER_METHOD, &request.path, true)
            .map_err(|e| ClientError::Transport(format!("open: {e:?}")))?;
        xhr.set_request_header("Content-Type", request.content_type)
            .map_err(|e| ClientError::Transport(format!("set_request_header: {e:?}")))?;

        let mut on_success = Some(on_success);
        let xhr_done = xhr.clone();
        let onload = Closure::<dyn FnMut()>::new(move || {
            let status = xhr_done.status().unwrap_or(0);
            deliver_on_success(status, xhr_done.clone().into(), &mut on_success);
        });
        xhr.set_onload(Some(onload.as_ref().unchecked_ref()));
        onload.forget();

        xhr.send_with_opt_str(Some(&request.body))
            .map_err(|e| ClientError::Transport(format!("send: {e:?}")))?;
        Ok(xhr)
    }
}
