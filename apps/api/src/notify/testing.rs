//! Recording channel fakes for scheduler tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::notify::{ChatSender, EmailSender, NotifyError};

/// How a fake channel behaves on `send`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    Succeed,
    Fail,
    /// Never completes; exercises the caller's timeout.
    Hang,
}

async fn act(behaviour: Behaviour) -> Result<(), NotifyError> {
    match behaviour {
        Behaviour::Succeed => Ok(()),
        Behaviour::Fail => Err(NotifyError::Api {
            status: 503,
            message: "provider down".to_string(),
        }),
        Behaviour::Hang => std::future::pending().await,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

pub struct RecordingEmail {
    behaviour: Behaviour,
    pub sent: Mutex<Vec<SentEmail>>,
}

impl RecordingEmail {
    pub fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for RecordingEmail {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        });
        act(self.behaviour).await
    }
}

pub struct RecordingChat {
    behaviour: Behaviour,
    pub sent: Mutex<Vec<(String, String)>>,
}

impl RecordingChat {
    pub fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatSender for RecordingChat {
    async fn send(&self, to: &str, text: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), text.to_string()));
        act(self.behaviour).await
    }
}
