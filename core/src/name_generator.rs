//! Deterministic user name and email generation from curated lists.
//!
//! All generation is deterministic (same RNG seed = same names).

use crate::rng::StreamRng;

/// Deterministic name generator using curated name lists
pub struct NameGenerator;

impl NameGenerator {
    /// Generate a full name (first + last) deterministically
    pub fn generate_full_name(rng: &mut StreamRng) -> String {
        let first_name = Self::generate_first_name(rng);
        let last_name = Self::generate_last_name(rng);
        format!("{} {}", first_name, last_name)
    }

    pub fn generate_first_name(rng: &mut StreamRng) -> &'static str {
        *rng.choose(Self::first_names())
    }

    pub fn generate_last_name(rng: &mut StreamRng) -> &'static str {
        *rng.choose(Self::last_names())
    }

    /// Email for a full name. `ordinal` keeps addresses unique when two
    /// users draw the same name.
    pub fn email_for(full_name: &str, ordinal: usize) -> String {
        let local: String = full_name
            .split_whitespace()
            .map(|part| part.to_ascii_lowercase())
            .collect::<Vec<_>>()
            .join(".");
        format!("{local}{ordinal}@example.com")
    }

    fn first_names() -> &'static [&'static str] {
        &[
            // Yoruba
            "Adebayo", "Adewale", "Ayodele", "Babatunde", "Damilola", "Folake",
            "Funmilayo", "Kehinde", "Olumide", "Oluwaseun", "Temitope", "Titilayo",
            "Yetunde", "Bolaji", "Morenike", "Tolulope",
            // Igbo
            "Chidi", "Chinedu", "Chiamaka", "Chioma", "Ebuka", "Ifeoma", "Kelechi",
            "Nkechi", "Obinna", "Uchenna", "Adaeze", "Emeka", "Ngozi", "Somto",
            // Hausa / Fulani
            "Abubakar", "Aisha", "Amina", "Bashir", "Fatima", "Hadiza", "Ibrahim",
            "Maryam", "Musa", "Sadiq", "Umar", "Zainab", "Halima", "Yusuf",
            // Common English
            "Daniel", "David", "Grace", "Joseph", "Mary", "Michael", "Samuel",
            "Esther", "Victoria", "Peter",
        ]
    }

    fn last_names() -> &'static [&'static str] {
        &[
            "Adeyemi", "Afolabi", "Akinola", "Balogun", "Bello", "Okafor", "Okeke",
            "Okonkwo", "Eze", "Nwosu", "Obi", "Ogunleye", "Olawale", "Adebayo",
            "Abdullahi", "Aliyu", "Danjuma", "Garba", "Lawal", "Mohammed", "Sani",
            "Usman", "Yakubu", "Ibrahim", "Chukwu", "Nnamdi", "Uzor", "Oyelaran",
            "Fashola", "Ogunbiyi", "Adeleke", "Ekwueme", "Onyekachi", "Ikenna",
            "Babangida", "Tinubu", "Ojo", "Salami", "Osagie", "Edet",
        ]
    }
}
