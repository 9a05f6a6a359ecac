use policyhub_core::products::{Choice, Cover, Product, Question, QuestionKind};
use rust_decimal_macros::dec;

fn cover(code: &str, name: &str, description: &str, optional: bool) -> Cover {
    Cover {
        code: code.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        optional,
        sum_insured: None,
    }
}

fn numeric(code: &str, index: u32, text: &str) -> Question {
    Question {
        code: code.to_string(),
        index,
        text: text.to_string(),
        kind: QuestionKind::Numeric,
    }
}

fn choice(code: &str, index: u32, text: &str, choices: &[(&str, &str)]) -> Question {
    Question {
        code: code.to_string(),
        index,
        text: text.to_string(),
        kind: QuestionKind::Choice {
            choices: choices
                .iter()
                .map(|(code, label)| Choice {
                    code: code.to_string(),
                    label: label.to_string(),
                })
                .collect(),
        },
    }
}

fn yes_no(code: &str, index: u32, text: &str) -> Question {
    choice(code, index, text, &[("YES", "Yes"), ("NO", "No")])
}

pub fn products() -> Vec<Product> {
    vec![travel(), house(), farm(), car()]
}

fn travel() -> Product {
    Product {
        code: "TRI".to_string(),
        name: "Safe Traveller".to_string(),
        image: "/static/travel.jpg".to_string(),
        description: "Insurance for travellers".to_string(),
        max_number_of_insured: 10,
        covers: vec![
            Cover {
                sum_insured: Some(dec!(5000)),
                ..cover("C1", "Medical expenses", "Reimburses medical expenses abroad", false)
            },
            Cover {
                sum_insured: Some(dec!(1000)),
                ..cover("C2", "Luggage", "Reimburses lost or damaged luggage", true)
            },
            cover("C3", "Accidents", "Compensation for permanent injury", true),
        ],
        questions: vec![
            numeric("NUM_OF_ADULTS", 1, "Number of adults"),
            numeric("NUM_OF_CHILDREN", 2, "Number of children"),
            choice(
                "DESTINATION",
                3,
                "Destination",
                &[("PL", "Poland"), ("EUR", "Europe"), ("WORLD", "World")],
            ),
        ],
    }
}

fn house() -> Product {
    Product {
        code: "HSI".to_string(),
        name: "Happy House".to_string(),
        image: "/static/house.jpg".to_string(),
        description: "House and apartment insurance".to_string(),
        max_number_of_insured: 1,
        covers: vec![
            Cover {
                sum_insured: Some(dec!(200000)),
                ..cover("C1", "Fire", "Damage caused by fire and explosion", false)
            },
            cover("C2", "Flood", "Damage caused by flood", true),
            cover("C3", "Theft", "Theft and burglary", true),
            cover("C4", "Assistance", "Plumber and locksmith assistance", true),
        ],
        questions: vec![
            choice(
                "TYP",
                1,
                "Property type",
                &[("APT", "Apartment"), ("HOUSE", "House")],
            ),
            numeric("AREA", 2, "Area in square meters"),
            numeric("NUM_OF_CLAIM", 3, "Claims in the last 5 years"),
            yes_no("FLOOD", 4, "Located in a flood area"),
        ],
    }
}

fn farm() -> Product {
    Product {
        code: "FAI".to_string(),
        name: "Happy Farmer".to_string(),
        image: "/static/farm.jpg".to_string(),
        description: "Crops, livestock and machinery insurance".to_string(),
        max_number_of_insured: 1,
        covers: vec![
            cover("C1", "Crops", "Crop loss caused by weather", false),
            cover("C2", "Livestock", "Death of livestock", true),
            cover("C3", "Machinery", "Damage to farm machinery", true),
        ],
        questions: vec![
            numeric("AREA", 1, "Cultivated area in hectares"),
            numeric("ANIMALS", 2, "Number of animals"),
            yes_no("FLOOD", 3, "Located in a flood area"),
        ],
    }
}

fn car() -> Product {
    Product {
        code: "CAR".to_string(),
        name: "Happy Driver".to_string(),
        image: "/static/car.jpg".to_string(),
        description: "Motor third party liability and casco".to_string(),
        max_number_of_insured: 1,
        covers: vec![
            cover("C1", "Third party liability", "Mandatory liability cover", false),
            cover("C2", "Casco", "Damage to the insured vehicle", true),
            cover("C3", "Assistance", "Towing and replacement car", true),
        ],
        questions: vec![
            numeric("NUM_OF_CLAIM", 1, "Claims in the last 5 years"),
            numeric("DRIVER_AGE", 2, "Age of the main driver"),
            numeric("CAR_VALUE", 3, "Market value of the car"),
        ],
    }
}
