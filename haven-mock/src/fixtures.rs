use haven_core::Category;

pub struct Place {
    pub name: &'static str,
    pub category: Category,
    pub latitude: f64,
    pub longitude: f64,
    pub address: &'static str,
    pub phone: Option<&'static str>,
}

pub const SAN_DIEGO: &[Place] = &[
    Place {
        name: "Downtown Safe Sleep Center",
        category: Category::Shelter,
        latitude: 32.7216,
        longitude: -117.1652,
        address: "1255 Imperial Ave, San Diego, CA",
        phone: Some("619-555-0101"),
    },
    Place {
        name: "Father Joe's Villages",
        category: Category::Shelter,
        latitude: 32.7069,
        longitude: -117.1486,
        address: "3350 E St, San Diego, CA",
        phone: Some("619-555-0102"),
    },
    Place {
        name: "Community Kitchen on Broadway",
        category: Category::Food,
        latitude: 32.7157,
        longitude: -117.1580,
        address: "820 Broadway, San Diego, CA",
        phone: None,
    },
    Place {
        name: "Family Health Clinic",
        category: Category::Medical,
        latitude: 32.7199,
        longitude: -117.1545,
        address: "1809 National Ave, San Diego, CA",
        phone: Some("619-555-0104"),
    },
    Place {
        name: "Neil Good Day Center",
        category: Category::Hygiene,
        latitude: 32.7096,
        longitude: -117.1519,
        address: "299 17th St, San Diego, CA",
        phone: None,
    },
    Place {
        name: "Oceanside Winter Shelter",
        category: Category::Shelter,
        latitude: 33.1959,
        longitude: -117.3795,
        address: "2101 Mission Ave, Oceanside, CA",
        phone: None,
    },
];
