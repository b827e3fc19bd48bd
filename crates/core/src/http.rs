use crate::config::BodyEncoding;
use crate::error::ClientError;

/// The trigger carries its pair in the body, so it is always a POST.
pub const TRIGGER_METHOD: &str = "POST";

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=utf-8";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerRequest {
    pub path: String,
    pub content_type: &'static str,
    pub body: String,
}

/// Fire-and-forget request sender.
///
/// Requests go out as [`TRIGGER_METHOD`]. Implementations hand each completion
/// to [`deliver_on_success`], so `on_success` runs at most once and only for a
/// status accepted by [`is_success_status`]. Other outcomes are not reported.
pub trait Transport {
    type Response;
    type Handle;

    fn send(
        &self,
        request: TriggerRequest,
        on_success: Box<dyn FnOnce(Self::Response)>,
    ) -> Result<Self::Handle, ClientError>;
}

pub fn trigger_body(field: &str, value: &str, encoding: BodyEncoding) -> String {
    match encoding {
        BodyEncoding::Raw => format!("{field}={value}"),
        BodyEncoding::FormUrlEncoded => url::form_urlencoded::Serializer::new(String::new())
            .append_pair(field, value)
            .finish(),
    }
}

/// 2xx-ish statuses counted as success, including the 304 and IE's 1223
/// stand-in for 204.
pub fn is_success_status(status: u16) -> bool {
    matches!(status, 200 | 201 | 202 | 204 | 206 | 304 | 1223)
}

/// Run the pending success callback if `status` counts as success.
/// Returns whether it ran.
pub fn deliver_on_success<R>(
    status: u16,
    response: R,
    on_success: &mut Option<Box<dyn FnOnce(R)>>,
) -> bool {
    if !is_success_status(status) {
        tracing::debug!(status, "trigger request finished without success");
        return false;
    }
    match on_success.take() {
        Some(cb) => {
            cb(response);
            true
        }
        None => false,
    }
}
