//! Core types for deck-users

use deck_search::Searchable;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geo {
    pub lat: String,
    pub lng: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
    pub geo: Option<Geo>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Company {
    pub name: String,
    pub catch_phrase: String,
    pub bs: String,
}

/// A directory entry
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub address: Option<Address>,
    pub company: Option<Company>,
}

impl User {
    /// Uppercased first letter of the name, for avatars.
    pub fn initial(&self) -> Option<char> {
        self.name.chars().next().map(|c| c.to_ascii_uppercase())
    }

    pub fn company_name(&self) -> Option<&str> {
        self.company
            .as_ref()
            .map(|c| c.name.as_str())
            .filter(|name| !name.is_empty())
    }

    pub fn city(&self) -> Option<&str> {
        self.address
            .as_ref()
            .map(|a| a.city.as_str())
            .filter(|city| !city.is_empty())
    }

    pub fn zipcode(&self) -> Option<&str> {
        self.address
            .as_ref()
            .map(|a| a.zipcode.as_str())
            .filter(|zip| !zip.is_empty())
    }
}

impl Searchable for User {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.email.as_str(),
            self.username.as_str(),
        ]
    }
}
