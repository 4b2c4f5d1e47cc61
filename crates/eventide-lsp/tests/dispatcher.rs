//! End-to-end scenarios against the dispatcher's public surface.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use eventide_lsp::{LanguageServer, Transport};
use serde_json::{json, Value};

struct FakeTransport {
    incoming: VecDeque<String>,
    outgoing: Rc<RefCell<Vec<String>>>,
}

#[async_trait(?Send)]
impl Transport for FakeTransport {
    async fn read_message(&mut self) -> Option<String> {
        self.incoming.pop_front()
    }

    async fn write_message(&mut self, payload: &str) -> bool {
        self.outgoing.borrow_mut().push(payload.to_string());
        true
    }
}

#[test]
fn dispatcher_ordering_notifications_before_request() {
    let outgoing = Rc::new(RefCell::new(Vec::new()));
    let transport = FakeTransport {
        incoming: VecDeque::from([
            r#"{"jsonrpc":"2.0","id":1,"method":"test/add","params":{"a":2,"b":3}}"#.to_string(),
            r#"{"jsonrpc":"2.0","method":"test/note","params":{"text":"first"}}"#.to_string(),
            r#"{"jsonrpc":"2.0","method":"test/note","params":{"text":"second"}}"#.to_string(),
        ]),
        outgoing: outgoing.clone(),
    };

    let order = Rc::new(RefCell::new(Vec::new()));
    let first_seen = Rc::new(RefCell::new(false));
    let second_saw_first = Rc::new(RefCell::new(false));

    let mut server = LanguageServer::new(transport).unwrap();

    {
        let order = order.clone();
        server.register_request_handler("test/add", move |params: Value| {
            let order = order.clone();
            async move {
                order.borrow_mut().push("request".to_string());
                let a = params["a"].as_i64().unwrap_or(0);
                let b = params["b"].as_i64().unwrap_or(0);
                Ok(json!({ "sum": a + b }))
            }
        });
    }

    {
        let order = order.clone();
        let first_seen = first_seen.clone();
        let second_saw_first = second_saw_first.clone();
        server.register_notification_handler("test/note", move |params: Value| {
            let text = params["text"].as_str().unwrap_or("");
            if text == "first" {
                *first_seen.borrow_mut() = true;
                order.borrow_mut().push("note:first".to_string());
            } else if text == "second" {
                *second_saw_first.borrow_mut() = *first_seen.borrow();
                order.borrow_mut().push("note:second".to_string());
            }
        });
    }

    let code = server.start();
    assert_eq!(code, 0);

    let order = order.borrow();
    assert_eq!(*order, vec!["note:first", "note:second", "request"]);
    assert!(*second_saw_first.borrow());

    let outgoing = outgoing.borrow();
    assert_eq!(outgoing.len(), 1);
    let response: Value = serde_json::from_str(&outgoing[0]).unwrap();
    assert_eq!(response["jsonrpc"], "2.0");
    assert_eq!(response["id"], 1);
    assert_eq!(response["result"]["sum"], 5);
}

#[test]
fn method_not_found_produces_error_response() {
    let outgoing = Rc::new(RefCell::new(Vec::new()));
    let transport = FakeTransport {
        incoming: VecDeque::from([r#"{"jsonrpc":"2.0","id":9,"method":"missing"}"#.to_string()]),
        outgoing: outgoing.clone(),
    };

    let server = LanguageServer::new(transport).unwrap();
    let code = server.start();
    assert_eq!(code, 0);

    let outgoing = outgoing.borrow();
    assert_eq!(outgoing.len(), 1);
    let response: Value = serde_json::from_str(&outgoing[0]).unwrap();
    assert_eq!(response["id"], 9);
    assert_eq!(response["error"]["code"], -32601);
}

#[test]
fn explicit_method_registration_dispatches_by_name() {
    let outgoing = Rc::new(RefCell::new(Vec::new()));
    let transport = FakeTransport {
        incoming: VecDeque::from([
            r#"{"jsonrpc":"2.0","id":2,"method":"custom/add","params":{"a":7,"b":8}}"#
                .to_string(),
            r#"{"jsonrpc":"2.0","method":"custom/note","params":{"text":"hello"}}"#.to_string(),
        ]),
        outgoing: outgoing.clone(),
    };

    let notifications = Rc::new(RefCell::new(Vec::new()));
    let mut server = LanguageServer::new(transport).unwrap();

    server.register_request_handler("custom/add", |params: Value| async move {
        let a = params["a"].as_i64().unwrap_or(0);
        let b = params["b"].as_i64().unwrap_or(0);
        Ok(json!({ "sum": a + b }))
    });

    {
        let notifications = notifications.clone();
        server.register_notification_handler("custom/note", move |params: Value| {
            notifications
                .borrow_mut()
                .push(params["text"].as_str().unwrap_or("").to_string());
        });
    }

    assert_eq!(server.start(), 0);

    assert_eq!(*notifications.borrow(), vec!["hello".to_string()]);
    let outgoing = outgoing.borrow();
    assert_eq!(outgoing.len(), 1);
    let response: Value = serde_json::from_str(&outgoing[0]).unwrap();
    assert_eq!(response["id"], 2);
    assert_eq!(response["result"]["sum"], 15);
}

#[test]
fn handler_failure_produces_request_failed_error() {
    let outgoing = Rc::new(RefCell::new(Vec::new()));
    let transport = FakeTransport {
        incoming: VecDeque::from([r#"{"jsonrpc":"2.0","id":3,"method":"boom"}"#.to_string()]),
        outgoing: outgoing.clone(),
    };

    let mut server = LanguageServer::new(transport).unwrap();
    server.register_request_handler("boom", |_params: Value| async move {
        Err("handler exploded".to_string())
    });

    assert_eq!(server.start(), 0);

    let outgoing = outgoing.borrow();
    assert_eq!(outgoing.len(), 1);
    let response: Value = serde_json::from_str(&outgoing[0]).unwrap();
    assert_eq!(response["error"]["code"], -32803);
    assert_eq!(response["error"]["message"], "handler exploded");
}

#[test]
fn malformed_messages_are_dropped_silently() {
    let outgoing = Rc::new(RefCell::new(Vec::new()));
    let transport = FakeTransport {
        incoming: VecDeque::from([
            "not json at all".to_string(),
            r#"{"jsonrpc":"2.0","params":{"x":1}}"#.to_string(),
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#.to_string(),
        ]),
        outgoing: outgoing.clone(),
    };

    let mut server = LanguageServer::new(transport).unwrap();
    server.register_request_handler("ping", |_params: Value| async move { Ok(json!("pong")) });

    assert_eq!(server.start(), 0);
    let outgoing = outgoing.borrow();
    assert_eq!(outgoing.len(), 1);
    let response: Value = serde_json::from_str(&outgoing[0]).unwrap();
    assert_eq!(response["result"], "pong");
}
