use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::dom::{Dom, ElementSpec};
use crate::error::ClientError;
use crate::http::{trigger_body, Transport, TriggerRequest, FORM_CONTENT_TYPE};
use crate::socket::{LiveLog, LogSocket};

/// The page's user-visible log. `Object` is the platform's opaque value type
/// (a `JsValue` in the browser).
pub trait Console: Clone + 'static {
    type Object;

    fn log(&self, text: &str);

    fn log_obj(&self, obj: &Self::Object);
}

/// The crawl control page: one container, one input, one button, one live-log
/// socket.
pub struct Page<D, C, T, S>
where
    S: LogSocket,
{
    dom: D,
    console: C,
    transport: T,
    socket: S,
    config: ClientConfig,
    live_log: Rc<LiveLog<C>>,
    connection: RefCell<Option<S::Connection>>,
}

impl<D, C, T, S> Page<D, C, T, S>
where
    D: Dom + 'static,
    C: Console,
    T: Transport<Response = C::Object> + 'static,
    S: LogSocket<Error = C::Object> + 'static,
{
    pub fn new(dom: D, console: C, transport: T, socket: S, config: ClientConfig) -> Rc<Self> {
        Rc::new(Self {
            live_log: Rc::new(LiveLog::new(console.clone())),
            dom,
            console,
            transport,
            socket,
            config,
            connection: RefCell::new(None),
        })
    }

    pub fn live_log(&self) -> &LiveLog<C> {
        &self.live_log
    }

    /// Open the live-log socket, then render. Meant to run once at page load.
    pub fn init(self: &Rc<Self>) -> Result<D::Node, ClientError> {
        self.connect_live_log()?;
        self.render()
    }

    pub fn connect_live_log(&self) -> Result<(), ClientError> {
        let live = Rc::clone(&self.live_log);
        live.connecting();
        let conn = self
            .socket
            .open(&self.config.socket_url, Box::new(move |event| live.handle(event)))?;
        info!(url = %self.config.socket_url, "live-log socket opening");
        *self.connection.borrow_mut() = Some(conn);
        Ok(())
    }

    /// Clear the container and rebuild the domain input and crawl button.
    pub fn render(self: &Rc<Self>) -> Result<D::Node, ClientError> {
        let cfg = &self.config;
        let container = self
            .dom
            .by_id(&cfg.container_id)
            .ok_or_else(|| ClientError::MissingElement(cfg.container_id.clone()))?;
        self.dom.remove_children(&container)?;

        let input = self.dom.create(
            &ElementSpec::new("input")
                .attr("type", "text")
                .attr("id", cfg.domain_input_id.as_str()),
        )?;
        self.dom.append_child(&container, &input)?;

        let page = Rc::clone(self);
        let button = self.dom.create(
            &ElementSpec::new("button")
                .on(
                    "onclick",
                    Rc::new(move || {
                        if let Err(e) = page.crawl() {
                            warn!("crawl not triggered: {e}");
                        }
                    }),
                )
                .text(cfg.button_label.as_str()),
        )?;
        self.dom.append_child(&container, &button)?;

        debug!(container = %cfg.container_id, "rendered crawl controls");
        Ok(container)
    }

    /// Post the current domain to the trigger endpoint. Returns the in-flight
    /// request; only a successful response is ever logged.
    pub fn crawl(&self) -> Result<T::Handle, ClientError> {
        let cfg = &self.config;
        let input = self
            .dom
            .by_id(&cfg.domain_input_id)
            .ok_or_else(|| ClientError::MissingElement(cfg.domain_input_id.clone()))?;
        let domain = self.dom.value(&input);

        let request = TriggerRequest {
            path: cfg.trigger_path.clone(),
            content_type: FORM_CONTENT_TYPE,
            body: trigger_body(&cfg.trigger_field, &domain, cfg.body_encoding),
        };
        info!(domain = %domain, path = %request.path, "triggering crawl");

        let console = self.console.clone();
        self.transport
            .send(request, Box::new(move |response| console.log_obj(&response)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BodyEncoding;
    use crate::socket::{SocketEvent, SocketState};
    use crate::testing::{FakeConsole, FakeDom, FakeSocket, FakeTransport, LogLine};

    type TestPage = Page<FakeDom, FakeConsole, FakeTransport, FakeSocket>;

    struct Harness {
        dom: FakeDom,
        console: FakeConsole,
        transport: FakeTransport,
        socket: FakeSocket,
        page: Rc<TestPage>,
    }

    fn harness(config: ClientConfig) -> Harness {
        let dom = FakeDom::new();
        let body = dom.body();
        dom.add_element(body, "div", Some("content"));
        let console = FakeConsole::default();
        let transport = FakeTransport::default();
        let socket = FakeSocket::default();
        let page = Page::new(
            dom.clone(),
            console.clone(),
            transport.clone(),
            socket.clone(),
            config,
        );
        Harness {
            dom,
            console,
            transport,
            socket,
            page,
        }
    }

    fn assert_controls(h: &Harness, container: usize) {
        let kids = h.dom.children(container);
        assert_eq!(kids.len(), 2);
        assert_eq!(h.dom.tag(kids[0]).as_deref(), Some("input"));
        assert_eq!(h.dom.attribute(kids[0], "type").as_deref(), Some("text"));
        assert_eq!(h.dom.property(kids[0], "id").as_deref(), Some("domain"));
        assert_eq!(h.dom.tag(kids[1]).as_deref(), Some("button"));
        assert_eq!(h.dom.text_content(kids[1]), "Crawl");
    }

    #[test]
    fn render_replaces_prior_children() {
        let h = harness(ClientConfig::default());
        let content = h.dom.by_id("content").unwrap();
        h.dom.add_element(content, "p", Some("old"));
        h.dom.add_text(content, "stale text");

        let container = h.page.render().unwrap();
        assert_eq!(container, content);
        assert_controls(&h, container);
        assert!(h.dom.by_id("old").is_none());
    }

    #[test]
    fn render_twice_is_idempotent() {
        let h = harness(ClientConfig::default());
        h.page.render().unwrap();
        let container = h.page.render().unwrap();
        assert_controls(&h, container);
        assert_eq!(h.dom.attached_handler_count(), 1);
    }

    #[test]
    fn render_without_container_fails() {
        let h = harness(ClientConfig {
            container_id: "missing".into(),
            ..ClientConfig::default()
        });
        let err = h.page.render().unwrap_err();
        assert!(matches!(err, ClientError::MissingElement(ref id) if id == "missing"));
    }

    #[test]
    fn click_posts_domain_once() {
        let h = harness(ClientConfig::default());
        h.page.render().unwrap();
        let input = h.dom.by_id("domain").unwrap();
        h.dom.set_value(input, "example.com");

        let button = h.dom.children(h.dom.by_id("content").unwrap())[1];
        h.dom.click(button);

        let sent = h.transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].path, "/trigger");
        assert_eq!(sent[0].body, "domain=example.com");
        assert_eq!(sent[0].content_type, FORM_CONTENT_TYPE);
    }

    #[test]
    fn empty_field_posts_empty_value() {
        let h = harness(ClientConfig::default());
        h.page.render().unwrap();
        h.page.crawl().unwrap();
        assert_eq!(h.transport.requests()[0].body, "domain=");
    }

    #[test]
    fn ampersand_is_sent_raw_by_default() {
        let h = harness(ClientConfig::default());
        h.page.render().unwrap();
        h.dom.set_value(h.dom.by_id("domain").unwrap(), "a&b.com");
        h.page.crawl().unwrap();
        assert_eq!(h.transport.requests()[0].body, "domain=a&b.com");
    }

    #[test]
    fn ampersand_is_escaped_when_configured() {
        let h = harness(ClientConfig {
            body_encoding: BodyEncoding::FormUrlEncoded,
            ..ClientConfig::default()
        });
        h.page.render().unwrap();
        h.dom.set_value(h.dom.by_id("domain").unwrap(), "a&b.com");
        h.page.crawl().unwrap();
        assert_eq!(h.transport.requests()[0].body, "domain=a%26b.com");
    }

    #[test]
    fn crawl_before_render_reports_missing_input() {
        let h = harness(ClientConfig::default());
        let err = h.page.crawl().unwrap_err();
        assert!(matches!(err, ClientError::MissingElement(ref id) if id == "domain"));
        assert!(h.transport.requests().is_empty());
    }

    #[test]
    fn only_successful_responses_are_logged() {
        let h = harness(ClientConfig::default());
        h.page.render().unwrap();
        let first = h.page.crawl().unwrap();
        let second = h.page.crawl().unwrap();

        h.transport.complete(first, 500, "boom");
        assert!(h.console.lines().is_empty());

        h.transport.complete(second, 200, "xhr#2");
        assert_eq!(h.console.lines(), vec![LogLine::Object("xhr#2".into())]);
    }

    #[test]
    fn init_opens_socket_then_renders() {
        let h = harness(ClientConfig::default());
        let container = h.page.init().unwrap();
        assert_eq!(h.socket.opened_urls(), vec!["ws://localhost:3000/ws".to_string()]);
        assert_eq!(h.page.live_log().state(), SocketState::Connecting);
        assert_controls(&h, container);

        h.socket.emit(SocketEvent::Opened);
        h.socket.emit(SocketEvent::Message("hello".into()));
        h.socket.emit(SocketEvent::Error("reset".into()));
        h.socket.emit(SocketEvent::Closed);

        assert_eq!(
            h.console.lines(),
            vec![
                LogLine::Text("websocket opened".into()),
                LogLine::Text("hello".into()),
                LogLine::Text("websocket error".into()),
                LogLine::Object("reset".into()),
                LogLine::Text("websocket closed".into()),
            ]
        );
        assert_eq!(h.page.live_log().state(), SocketState::Closed);
    }

    #[test]
    fn custom_socket_url_and_trigger_path() {
        let h = harness(ClientConfig {
            socket_url: "wss://crawler.example/live".into(),
            trigger_path: "/api/trigger".into(),
            ..ClientConfig::default()
        });
        h.page.init().unwrap();
        h.page.crawl().unwrap();
        assert_eq!(h.socket.opened_urls(), vec!["wss://crawler.example/live".to_string()]);
        assert_eq!(h.transport.requests()[0].path, "/api/trigger");
    }
}
