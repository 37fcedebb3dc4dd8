//! Client-side filtering and ordering over already-fetched collections.
//!
//! List views project collection state directly; the server is not
//! consulted. Search is a case-insensitive substring match over an entity's
//! searchable fields, and sorting is case-insensitive lexicographic.

use crate::models::{Doctor, Patient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Id,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Entities the list views can search and sort.
pub trait Queryable {
    fn sort_name(&self) -> &str;
    fn sort_id(&self) -> String;
    /// Field values the search box matches against.
    fn search_terms(&self) -> Vec<&str>;
}

/// Rows whose searchable fields contain `term`, case-insensitively. A blank
/// term keeps everything.
pub fn search<T: Queryable + Clone>(items: &[T], term: &str) -> Vec<T> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|item| {
            item.search_terms()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Order rows in place. The underlying sort is stable, so equal keys keep
/// their fetched order.
pub fn sort<T: Queryable>(items: &mut [T], field: SortField, order: SortOrder) {
    items.sort_by(|a, b| {
        let ordering = match field {
            SortField::Name => a
                .sort_name()
                .to_lowercase()
                .cmp(&b.sort_name().to_lowercase()),
            SortField::Id => a.sort_id().cmp(&b.sort_id()),
        };
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
}

impl Queryable for Patient {
    fn sort_name(&self) -> &str {
        &self.name
    }

    fn sort_id(&self) -> String {
        self.id.to_string()
    }

    fn search_terms(&self) -> Vec<&str> {
        let mut terms = vec![self.name.as_str()];
        terms.extend(self.contact.as_deref());
        terms.extend(self.email.as_deref());
        terms.extend(self.abha_id.as_deref());
        terms.extend(self.address.as_deref());
        terms
    }
}

impl Queryable for Doctor {
    fn sort_name(&self) -> &str {
        &self.name
    }

    fn sort_id(&self) -> String {
        self.id.to_string()
    }

    fn search_terms(&self) -> Vec<&str> {
        let mut terms = vec![self.name.as_str(), self.specialization.as_str()];
        terms.extend(self.email.as_deref());
        terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn patient(name: &str, id: &str) -> Patient {
        Patient {
            id: Uuid::parse_str(id).unwrap(),
            name: name.to_string(),
            age: 40,
            gender: "F".to_string(),
            contact: None,
            email: None,
            abha_id: None,
            address: None,
            photo_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn sort_by_name_ascending() {
        let mut patients = vec![
            patient("Bob", "22222222-2222-2222-2222-222222222222"),
            patient("Alice", "11111111-1111-1111-1111-111111111111"),
        ];
        sort(&mut patients, SortField::Name, SortOrder::Ascending);
        let names: Vec<_> = patients.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Alice", "Bob"]);
    }

    #[test]
    fn sort_by_id_descending() {
        let mut patients = vec![
            patient("Bob", "22222222-2222-2222-2222-222222222222"),
            patient("Alice", "11111111-1111-1111-1111-111111111111"),
        ];
        sort(&mut patients, SortField::Id, SortOrder::Descending);
        assert!(patients[0].id.to_string().starts_with("2"));
        assert!(patients[1].id.to_string().starts_with("1"));
    }

    #[test]
    fn name_sort_is_case_insensitive() {
        let mut patients = vec![
            patient("bob", "22222222-2222-2222-2222-222222222222"),
            patient("Alice", "11111111-1111-1111-1111-111111111111"),
            patient("CARA", "33333333-3333-3333-3333-333333333333"),
        ];
        sort(&mut patients, SortField::Name, SortOrder::Ascending);
        let names: Vec<_> = patients.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Alice", "bob", "CARA"]);
    }

    #[test]
    fn search_matches_any_field() {
        let mut anand = patient("Anand", "11111111-1111-1111-1111-111111111111");
        anand.contact = Some("99880 12345".to_string());
        let bela = patient("Bela", "22222222-2222-2222-2222-222222222222");
        let rows = vec![anand, bela];

        assert_eq!(search(&rows, "anand").len(), 1);
        assert_eq!(search(&rows, "99880").len(), 1);
        assert_eq!(search(&rows, "zz").len(), 0);
        assert_eq!(search(&rows, "  ").len(), 2);
    }
}
