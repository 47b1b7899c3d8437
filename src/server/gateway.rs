use std::sync::Arc;

use dashmap::DashMap;

use crate::{
    common::ListenerId,
    protocol::OutgoingMessage,
    room::Broadcaster,
    server::Session,
};

/// Connected sessions by listener. Rooms deliver through it.
#[derive(Default)]
pub struct Gateway {
    sessions: DashMap<ListenerId, Arc<Session>>,
}

impl Gateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, session: Arc<Session>) {
        self.sessions.insert(session.listener_id.clone(), session);
    }

    pub fn unregister(&self, listener: &ListenerId) -> Option<Arc<Session>> {
        self.sessions.remove(listener).map(|(_, session)| session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Broadcaster for Gateway {
    fn deliver(&self, listener: &ListenerId, message: &OutgoingMessage) {
        if let Some(session) = self.sessions.get(listener) {
            session.send_message(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::ws::Message;

    #[test]
    fn test_deliver_to_registered_session() {
        let gateway = Gateway::new();
        let (tx, rx) = flume::unbounded();
        let id = ListenerId::from("l1");
        gateway.register(Arc::new(Session::new(id.clone(), tx)));

        gateway.deliver(&id, &OutgoingMessage::Error { message: "nope".into() });
        match rx.try_recv().unwrap() {
            Message::Text(text) => {
                assert_eq!(text.as_str(), r#"{"event":"error","message":"nope"}"#)
            }
            other => panic!("unexpected {:?}", other),
        }

        gateway.unregister(&id);
        gateway.deliver(&id, &OutgoingMessage::Error { message: "gone".into() });
        assert!(rx.try_recv().is_err());
        assert!(gateway.is_empty());
    }
}
