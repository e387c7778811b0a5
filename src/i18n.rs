//! Interface languages and the translation table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    En,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::En => "en",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Es => "Español",
            Language::En => "English",
        }
    }

    /// Next language in `supported`, wrapping around.
    pub fn next_in(&self, supported: &[Language]) -> Language {
        match supported.iter().position(|l| l == self) {
            Some(idx) => supported[(idx + 1) % supported.len()],
            None => supported.first().copied().unwrap_or(*self),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "es" => Ok(Language::Es),
            "en" => Ok(Language::En),
            other => Err(format!("unsupported language '{other}'")),
        }
    }
}

/// Look up `key` for `language`, then in the fallback language, then give
/// the key back unchanged.
pub fn translate<'a>(key: &'a str, language: Language) -> &'a str {
    translate_with_fallback(key, language, Language::default())
}

pub fn translate_with_fallback<'a>(key: &'a str, language: Language, fallback: Language) -> &'a str {
    lookup(table(language), key)
        .or_else(|| lookup(table(fallback), key))
        .unwrap_or(key)
}

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

fn table(language: Language) -> &'static [(&'static str, &'static str)] {
    match language {
        Language::Es => ES,
        Language::En => EN,
    }
}

const ES: &[(&str, &str)] = &[
    ("app.title", "Gestión de Usuarios"),
    ("app.description", "Aplicación de ejemplo con canales pub/sub"),
    ("home.subtitle", "Componentes que se comunican por canales"),
    (
        "home.description",
        "Explora canales, controladores de página, propiedades acotadas y más.",
    ),
    ("home.languageChanged", "Idioma cambiado a"),
    ("navigation.home", "Inicio"),
    ("navigation.users", "Usuarios"),
    ("navigation.second", "Segunda Página"),
    ("navigation.back", "Volver"),
    ("navigation.language", "Idioma"),
    ("navigation.login", "Iniciar sesión"),
    ("navigation.logout", "Cerrar sesión"),
    ("navigation.guest", "invitado"),
    ("login.title", "Iniciar sesión"),
    ("login.hint", "Usuarios de prueba: admin/admin, user/user"),
    ("login.loading", "Autenticando..."),
    ("login.missingFields", "Por favor completa todos los campos"),
    ("users.title", "Lista de Usuarios"),
    ("users.subtitle", "Explora la lista completa de usuarios disponibles"),
    ("users.loading", "Cargando usuarios..."),
    ("users.error", "Error al cargar usuarios"),
    ("users.retry", "Reintentar"),
    ("users.search", "Buscar usuarios"),
    ("users.searchPlaceholder", "Buscar por nombre, email o usuario..."),
    ("users.noResults", "No se encontraron usuarios"),
    ("users.empty", "No hay usuarios disponibles"),
    ("users.viewDetail", "Ver detalle"),
    ("users.total", "Total"),
    ("users.filtered", "Filtrados"),
    ("users.clear", "Limpiar"),
    ("users.reload", "Recargar"),
    ("users.detail", "Detalle del Usuario"),
    ("userDetail.title", "Detalle de Usuario"),
    ("userDetail.loading", "Cargando usuario..."),
    ("userDetail.error", "Error al cargar usuario"),
    ("userDetail.notFound", "Usuario no encontrado"),
    ("userDetail.backToUsers", "Volver a usuarios"),
    ("userDetail.personalInfo", "Información Personal"),
    ("userDetail.contactInfo", "Información de Contacto"),
    ("userDetail.phone", "Teléfono"),
    ("userDetail.website", "Web"),
    ("userDetail.company", "Empresa"),
    ("userDetail.city", "Ciudad"),
    ("userDetail.zipcode", "Código postal"),
    ("userDetail.noWebsite", "Sin web"),
    ("userDetail.noCompany", "Sin empresa"),
    ("userDetail.noCity", "Sin ciudad"),
    ("userDetail.noZipcode", "Sin código"),
    ("second.title", "Segunda Página"),
    ("second.loaded", "Página segunda cargada"),
    ("second.channelDemo", "Canal usado {n} veces"),
    ("second.stateDemo", "Página vista {n} veces"),
    ("actions.save", "Guardar"),
    ("actions.cancel", "Cancelar"),
    ("actions.delete", "Eliminar"),
    ("actions.edit", "Editar"),
    ("actions.close", "Cerrar"),
];

const EN: &[(&str, &str)] = &[
    ("app.title", "User Management"),
    ("app.description", "Sample application with pub/sub channels"),
    ("home.subtitle", "Components talking over channels"),
    (
        "home.description",
        "Explore channels, page controllers, bounded properties and more.",
    ),
    ("home.languageChanged", "Language changed to"),
    ("navigation.home", "Home"),
    ("navigation.users", "Users"),
    ("navigation.second", "Second Page"),
    ("navigation.back", "Back"),
    ("navigation.language", "Language"),
    ("navigation.login", "Log in"),
    ("navigation.logout", "Log out"),
    ("navigation.guest", "guest"),
    ("login.title", "Log in"),
    ("login.hint", "Test users: admin/admin, user/user"),
    ("login.loading", "Authenticating..."),
    ("login.missingFields", "Please fill in all fields"),
    ("users.title", "Users List"),
    ("users.subtitle", "Explore the complete list of available users"),
    ("users.loading", "Loading users..."),
    ("users.error", "Error loading users"),
    ("users.retry", "Retry"),
    ("users.search", "Search users"),
    ("users.searchPlaceholder", "Search by name, email or username..."),
    ("users.noResults", "No users found"),
    ("users.empty", "No users available"),
    ("users.viewDetail", "View detail"),
    ("users.total", "Total"),
    ("users.filtered", "Filtered"),
    ("users.clear", "Clear"),
    ("users.reload", "Reload"),
    ("users.detail", "User Detail"),
    ("userDetail.title", "User Detail"),
    ("userDetail.loading", "Loading user..."),
    ("userDetail.error", "Error loading user"),
    ("userDetail.notFound", "User not found"),
    ("userDetail.backToUsers", "Back to users"),
    ("userDetail.personalInfo", "Personal Information"),
    ("userDetail.contactInfo", "Contact Information"),
    ("userDetail.phone", "Phone"),
    ("userDetail.website", "Website"),
    ("userDetail.company", "Company"),
    ("userDetail.city", "City"),
    ("userDetail.zipcode", "Zip code"),
    ("userDetail.noWebsite", "No website"),
    ("userDetail.noCompany", "No company"),
    ("userDetail.noCity", "No city"),
    ("userDetail.noZipcode", "No zip code"),
    ("second.title", "Second Page"),
    ("second.loaded", "Second page loaded"),
    ("second.channelDemo", "Channel used {n} times"),
    ("second.stateDemo", "Page viewed {n} times"),
    ("actions.save", "Save"),
    ("actions.cancel", "Cancel"),
    ("actions.delete", "Delete"),
    ("actions.edit", "Edit"),
    ("actions.close", "Close"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_known_keys() {
        assert_eq!(translate("users.title", Language::Es), "Lista de Usuarios");
        assert_eq!(translate("users.title", Language::En), "Users List");
    }

    #[test]
    fn test_unknown_key_returns_key() {
        assert_eq!(translate("users.nope", Language::En), "users.nope");
    }

    #[test]
    fn test_tables_have_same_keys() {
        let es: Vec<_> = ES.iter().map(|(k, _)| *k).collect();
        let en: Vec<_> = EN.iter().map(|(k, _)| *k).collect();
        assert_eq!(es, en);
    }

    #[test]
    fn test_language_cycle_and_parse() {
        let supported = [Language::Es, Language::En];
        assert_eq!(Language::Es.next_in(&supported), Language::En);
        assert_eq!(Language::En.next_in(&supported), Language::Es);
        assert_eq!(Language::En.next_in(&[Language::Es]), Language::Es);
        assert_eq!(" EN ".parse::<Language>(), Ok(Language::En));
        assert!("fr".parse::<Language>().is_err());
    }
}
