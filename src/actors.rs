use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{info_span, Instrument};

#[async_trait]
pub trait Actor {
    type Message: Send;
    type Response: Send;

    async fn handle_message(&mut self, message: Self::Message) -> Self::Response;
}

#[derive(Debug, Error)]
#[error("The actor has stopped")]
pub struct ActorStopped;

pub struct ActorHandle<T: Actor> {
    message_sender: mpsc::Sender<MessageWrap<T::Message, T::Response>>,
}

impl<T: Actor> Clone for ActorHandle<T> {
    fn clone(&self) -> Self {
        ActorHandle {
            message_sender: self.message_sender.clone(),
        }
    }
}

impl<T: Actor> ActorHandle<T> {
    pub fn new(
        message_sender: mpsc::Sender<MessageWrap<T::Message, T::Response>>,
    ) -> ActorHandle<T> {
        ActorHandle { message_sender }
    }
}

impl<T: Actor> ActorHandle<T> {
    pub async fn send(&self, message: T::Message) -> Result<T::Response, ActorStopped> {
        let (response_sender, response_receiver) = oneshot::channel();

        self.message_sender
            .send(MessageWrap {
                message,
                respond_to: response_sender,
            })
            .await
            .map_err(|_| ActorStopped)?;

        response_receiver.await.map_err(|_| ActorStopped)
    }
}

pub struct MessageWrap<M: Send, R: Send> {
    pub message: M,
    pub respond_to: oneshot::Sender<R>,
}

/// Runs the actor on its own task. Messages are handled one at a time, in arrival order.
pub fn spawn<T>(mut actor: T, name: &'static str, buffer: usize) -> ActorHandle<T>
where
    T: Actor + Send + 'static,
    T::Message: 'static,
    T::Response: 'static,
{
    let (message_sender, mut message_receiver) = mpsc::channel(buffer);

    tokio::spawn(
        async move {
            while let Some(MessageWrap {
                message,
                respond_to,
            }) = message_receiver.recv().await
            {
                let response = actor.handle_message(message).await;
                let _ = respond_to.send(response);
            }
        }
        .instrument(info_span!("actor", name)),
    );

    ActorHandle::new(message_sender)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use async_trait::async_trait;

    use super::{spawn, Actor};

    struct Counter {
        total: u32,
    }

    #[async_trait]
    impl Actor for Counter {
        type Message = u32;
        type Response = u32;

        async fn handle_message(&mut self, message: u32) -> u32 {
            self.total += message;
            self.total
        }
    }

    #[test(tokio::test)]
    async fn handles_messages_in_order() {
        let handle = spawn(Counter { total: 0 }, "counter", 4);

        assert_eq!(handle.send(2).await.unwrap(), 2);
        assert_eq!(handle.send(3).await.unwrap(), 5);
        assert_eq!(handle.clone().send(1).await.unwrap(), 6);
    }
}
