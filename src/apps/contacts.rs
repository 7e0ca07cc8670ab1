//! Address book.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub id: u64,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

impl Contact {
    /// Up to two initials, upper-cased.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct ContactBook {
    contacts: Vec<Contact>,
    next_id: u64,
}

impl Default for ContactBook {
    fn default() -> Self {
        let seed = [
            ("Mamá", "555-1234", Some("mama@gmail.com")),
            ("Papá", "555-5678", Some("papa@gmail.com")),
            ("El que vende a BCV", "555-9012", None),
            ("Carlos Oficina", "555-3456", Some("carlos@empresa.com")),
        ];
        let contacts: Vec<Contact> = seed
            .iter()
            .enumerate()
            .map(|(i, (name, phone, email))| Contact {
                id: i as u64 + 1,
                name: name.to_string(),
                phone: phone.to_string(),
                email: email.map(str::to_string),
            })
            .collect();
        let next_id = contacts.len() as u64 + 1;
        ContactBook { contacts, next_id }
    }
}

impl ContactBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn get(&self, id: u64) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    /// Case-insensitive name match or substring of the number.
    pub fn search(&self, term: &str) -> Vec<&Contact> {
        let needle = term.to_lowercase();
        self.contacts
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle) || c.phone.contains(term))
            .collect()
    }

    /// Add a contact. Blank name or number is refused.
    pub fn add(&mut self, name: &str, phone: &str, email: Option<&str>) -> Option<u64> {
        let (name, phone) = (name.trim(), phone.trim());
        if name.is_empty() || phone.is_empty() {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.contacts.push(Contact {
            id,
            name: name.to_string(),
            phone: phone.to_string(),
            email: email.map(str::trim).filter(|e| !e.is_empty()).map(str::to_string),
        });
        Some(id)
    }

    pub fn delete(&mut self, id: u64) -> bool {
        let before = self.contacts.len();
        self.contacts.retain(|c| c.id != id);
        self.contacts.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_by_name_and_number() {
        let book = ContactBook::new();
        assert_eq!(book.search("mam").len(), 1);
        assert_eq!(book.search("555-56")[0].name, "Papá");
        assert_eq!(book.search("").len(), 4);
    }

    #[test]
    fn test_add_requires_name_and_number() {
        let mut book = ContactBook::new();
        assert!(book.add("  ", "123", None).is_none());
        let id = book.add("Ana", "555-0000", Some("")).unwrap();
        let ana = book.get(id).unwrap();
        assert_eq!(ana.email, None);
        assert!(book.delete(id));
        assert!(!book.delete(id));
    }

    #[test]
    fn test_initials() {
        let book = ContactBook::new();
        assert_eq!(book.all()[2].initials(), "EQ");
        assert_eq!(book.all()[0].initials(), "M");
    }
}
