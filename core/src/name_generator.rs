//! Farmer names for the synthetic dataset.
//!
//! The roster is fixed: farmer `i` always carries the `i`-th name, so ids and
//! names line up across every regeneration.

/// Deterministic name lookup over a curated roster.
pub struct NameGenerator;

impl NameGenerator {
    /// Name for the farmer at `index`. Wraps around past the roster end.
    pub fn farmer_name(index: usize) -> &'static str {
        let names = Self::farmer_names();
        names[index % names.len()]
    }

    pub fn roster_len() -> usize {
        Self::farmer_names().len()
    }

    /// Curated roster of 50 farmer names from the surveyed districts.
    fn farmer_names() -> &'static [&'static str] {
        &[
            "Ramesh Patil", "Suresh Jadhav", "Vijay Shinde", "Mahadev Pawar", "Ganesh More",
            "Dnyaneshwar Chavan", "Sanjay Deshmukh", "Prakash Kadam", "Nilesh Bhosale",
            "Anil Gaikwad", "Santosh Kamble", "Bharat Salunkhe", "Rajendra Mane",
            "Shankar Thorat", "Pandurang Mohite", "Sunil Khot", "Datta Nalawade",
            "Ashok Chorge", "Mohan Bane", "Kishor Kolekar", "Ajit Barde", "Tukaram Chougule",
            "Baban Nimbalkar", "Sachin Borade", "Deepak Jagtap", "Harish Wagh",
            "Ravindra Sonawane", "Umesh Chavan", "Balasaheb Ghorpade", "Nitin Koli",
            "Kailas Dhumal", "Shivaji Kokate", "Madhukar Shelke", "Arun Ingale",
            "Subhash Gavhane", "Pravin Chitale", "Eknath Doke", "Shrikant Tarte", "Vilas Ahire",
            "Bapu Dhok", "Mangesh Pise", "Kiran Landge", "Avinash Kale", "Yogesh Khandekar",
            "Maruti Godase", "Raju Pansare", "Vikram Raut", "Bhaskar Khairnar",
            "Narayan Bhalerao", "Hemant Suryawanshi",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn roster_has_fifty_unique_names() {
        assert_eq!(NameGenerator::roster_len(), 50);
        let unique: HashSet<_> = (0..50).map(NameGenerator::farmer_name).collect();
        assert_eq!(unique.len(), 50, "Roster contains duplicate names");
    }

    #[test]
    fn names_have_first_and_last_part() {
        for i in 0..NameGenerator::roster_len() {
            let name = NameGenerator::farmer_name(i);
            let parts: Vec<&str> = name.split_whitespace().collect();
            assert_eq!(parts.len(), 2, "Name should have exactly 2 parts: {}", name);
        }
    }

    #[test]
    fn lookup_wraps_past_roster_end() {
        assert_eq!(NameGenerator::farmer_name(50), NameGenerator::farmer_name(0));
    }
}
