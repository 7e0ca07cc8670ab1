//! Message threads with a local composer.

use chrono::Local;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: u64,
    pub text: String,
    pub time: String,
    pub is_me: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: u64,
    pub name: String,
    pub last_message: String,
    pub time: String,
    pub unread: u32,
    pub messages: Vec<Message>,
}

fn msg(id: u64, text: &str, time: &str, is_me: bool) -> Message {
    Message {
        id,
        text: text.to_string(),
        time: time.to_string(),
        is_me,
    }
}

fn conversation(id: u64, name: &str, time: &str, unread: u32, messages: Vec<Message>) -> Conversation {
    Conversation {
        id,
        name: name.to_string(),
        last_message: messages.last().map(|m| m.text.clone()).unwrap_or_default(),
        time: time.to_string(),
        unread,
        messages,
    }
}

#[derive(Debug, Clone)]
pub struct Inbox {
    conversations: Vec<Conversation>,
    active: Option<u64>,
    next_message_id: u64,
}

impl Default for Inbox {
    fn default() -> Self {
        let conversations = vec![
            conversation(
                1,
                "Ana",
                "10:30",
                2,
                vec![
                    msg(1, "Hola, ¿cómo estás?", "10:28", false),
                    msg(2, "¿Nos vemos mañana?", "10:30", false),
                ],
            ),
            conversation(
                2,
                "Prof. Mayerlin",
                "Ayer",
                0,
                vec![
                    msg(1, "Sabes que eres mi mejor alumno", "Ayer, 15:45", true),
                    msg(2, "Sí, profe ya sé", "Ayer, 16:30", false),
                    msg(3, "Gracias", "Ayer, 16:35", false),
                ],
            ),
            conversation(
                3,
                "Grupo Familiar",
                "Dom",
                0,
                vec![
                    msg(1, "Mamá: Recuerden traer bebidas", "Dom, 11:15", false),
                    msg(2, "Yo me encargo", "Dom, 11:20", true),
                    msg(3, "Papá: ¿A qué hora llegamos?", "Dom, 12:00", false),
                ],
            ),
        ];
        Inbox {
            conversations,
            active: None,
            next_message_id: 100,
        }
    }
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn active(&self) -> Option<&Conversation> {
        let id = self.active?;
        self.conversations.iter().find(|c| c.id == id)
    }

    /// Open a thread and mark it read.
    pub fn open(&mut self, id: u64) {
        if let Some(conv) = self.conversations.iter_mut().find(|c| c.id == id) {
            conv.unread = 0;
            self.active = Some(id);
        }
    }

    pub fn close(&mut self) {
        self.active = None;
    }

    pub fn total_unread(&self) -> u32 {
        self.conversations.iter().map(|c| c.unread).sum()
    }

    /// Append an outgoing message to the open thread. Blank text is ignored.
    pub fn send(&mut self, text: &str) -> bool {
        let Some(id) = self.active else {
            return false;
        };
        if text.trim().is_empty() {
            return false;
        }
        let Some(conv) = self.conversations.iter_mut().find(|c| c.id == id) else {
            return false;
        };

        self.next_message_id += 1;
        conv.messages.push(Message {
            id: self.next_message_id,
            text: text.to_string(),
            time: Local::now().format("%H:%M").to_string(),
            is_me: true,
        });
        conv.last_message = text.to_string();
        conv.time = "Ahora".to_string();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_marks_read() {
        let mut inbox = Inbox::new();
        assert_eq!(inbox.total_unread(), 2);
        inbox.open(1);
        assert_eq!(inbox.total_unread(), 0);
        assert_eq!(inbox.active().map(|c| c.id), Some(1));
    }

    #[test]
    fn test_send_appends_to_active_thread() {
        let mut inbox = Inbox::new();
        assert!(!inbox.send("hola"));

        inbox.open(2);
        assert!(!inbox.send("   "));
        assert!(inbox.send("Nos vemos"));

        let conv = inbox.active().unwrap();
        assert_eq!(conv.messages.len(), 4);
        assert_eq!(conv.last_message, "Nos vemos");
        assert_eq!(conv.time, "Ahora");
        assert!(conv.messages.last().unwrap().is_me);
    }
}
