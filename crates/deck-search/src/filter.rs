//! Substring matching across an item's searchable fields.

/// An item that exposes the text fields a search term is matched against.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

/// Whether any of `item`'s fields contains `term`, ignoring case.
/// An empty term matches everything.
pub fn matches_term<T: Searchable + ?Sized>(item: &T, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    matches_lowercase(item, &needle)
}

/// Filter `items` by `term`. An empty term returns the full collection.
pub fn filter_items<T: Searchable + Clone>(items: &[T], term: &str) -> Vec<T> {
    if term.is_empty() {
        return items.to_vec();
    }
    let needle = term.to_lowercase();
    items
        .iter()
        .filter(|item| matches_lowercase(*item, &needle))
        .cloned()
        .collect()
}

#[inline]
fn matches_lowercase<T: Searchable + ?Sized>(item: &T, needle: &str) -> bool {
    item.search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Person {
        name: &'static str,
        email: &'static str,
        handle: &'static str,
    }

    impl Searchable for Person {
        fn search_fields(&self) -> Vec<&str> {
            vec![self.name, self.email, self.handle]
        }
    }

    fn people() -> Vec<Person> {
        vec![
            Person {
                name: "Leanne Graham",
                email: "Sincere@april.biz",
                handle: "Bret",
            },
            Person {
                name: "Ervin Howell",
                email: "Shanna@melissa.tv",
                handle: "Antonette",
            },
            Person {
                name: "Clementine Bauch",
                email: "Nathan@yesenia.net",
                handle: "Samantha",
            },
        ]
    }

    #[test]
    fn test_empty_term_returns_everything() {
        assert_eq!(filter_items(&people(), ""), people());
    }

    #[test]
    fn test_match_is_case_insensitive_across_fields() {
        let by_name = filter_items(&people(), "GRAHAM");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].handle, "Bret");

        let by_email = filter_items(&people(), "melissa.TV");
        assert_eq!(by_email[0].name, "Ervin Howell");

        let by_handle = filter_items(&people(), "samANTHA");
        assert_eq!(by_handle[0].name, "Clementine Bauch");
    }

    #[test]
    fn test_term_matching_several_items_keeps_order() {
        // "an" appears in Leanne, Antonette and Samantha.
        let hits: Vec<_> = filter_items(&people(), "an")
            .into_iter()
            .map(|p| p.handle)
            .collect();
        assert_eq!(hits, vec!["Bret", "Antonette", "Samantha"]);
    }

    #[test]
    fn test_no_match() {
        assert!(filter_items(&people(), "zzz").is_empty());
        assert!(!matches_term(&people()[0], "zzz"));
        assert!(matches_term(&people()[0], ""));
    }
}
