use policyhub_core::pricing::{BasePremiumRule, DiscountMarkupRule, Tariff};
use rust_decimal_macros::dec;

pub fn tariffs() -> Vec<Tariff> {
    vec![travel(), house(), farm(), car()]
}

fn travel() -> Tariff {
    let travellers = "(NUM_OF_ADULTS + NUM_OF_CHILDREN)";
    Tariff {
        code: "TRI".to_string(),
        base_premium_rules: vec![
            BasePremiumRule::new(
                "C1",
                Some(r#"DESTINATION == "WORLD""#),
                &format!("{} * DAYS * 3.40M", travellers),
            ),
            BasePremiumRule::new(
                "C1",
                Some(r#"DESTINATION == "EUR""#),
                &format!("{} * DAYS * 2.60M", travellers),
            ),
            BasePremiumRule::new("C1", None, &format!("{} * DAYS * 1.50M", travellers)),
            BasePremiumRule::new("C2", None, &format!("{} * 25.00M", travellers)),
            BasePremiumRule::new("C3", None, "DAYS * 1.20M"),
        ],
        discount_markup_rules: vec![
            DiscountMarkupRule::new("NUM_OF_CHILDREN > 1", dec!(-0.10)),
            DiscountMarkupRule::new(r#"DAYS > 30 && DESTINATION == "WORLD""#, dec!(0.15)),
        ],
    }
}

fn house() -> Tariff {
    Tariff {
        code: "HSI".to_string(),
        base_premium_rules: vec![
            BasePremiumRule::new("C1", Some(r#"TYP == "APT""#), "AREA * 1.00M"),
            BasePremiumRule::new("C1", None, "AREA * 1.25M"),
            BasePremiumRule::new("C2", Some(r#"FLOOD == "YES""#), "AREA * 0.90M"),
            BasePremiumRule::new("C2", None, "AREA * 0.45M"),
            BasePremiumRule::new("C3", Some(r#"TYP == "APT""#), "120M"),
            BasePremiumRule::new("C3", None, "200M"),
            BasePremiumRule::new("C4", None, "25M"),
        ],
        discount_markup_rules: vec![
            DiscountMarkupRule::new("NUM_OF_CLAIM > 1", dec!(0.25)),
            DiscountMarkupRule::new("NUM_OF_CLAIM == 0", dec!(-0.05)),
        ],
    }
}

fn farm() -> Tariff {
    Tariff {
        code: "FAI".to_string(),
        base_premium_rules: vec![
            BasePremiumRule::new("C1", None, "AREA * 0.40M"),
            BasePremiumRule::new("C2", None, "ANIMALS * 8M"),
            BasePremiumRule::new("C3", None, "300M"),
        ],
        discount_markup_rules: vec![DiscountMarkupRule::new(r#"FLOOD == "YES""#, dec!(0.20))],
    }
}

fn car() -> Tariff {
    Tariff {
        code: "CAR".to_string(),
        base_premium_rules: vec![
            BasePremiumRule::new("C1", Some("DRIVER_AGE < 25"), "650M"),
            BasePremiumRule::new("C1", None, "450M"),
            BasePremiumRule::new("C2", None, "CAR_VALUE * 0.045M"),
            BasePremiumRule::new("C3", None, "90M"),
        ],
        discount_markup_rules: vec![
            DiscountMarkupRule::new("NUM_OF_CLAIM == 0", dec!(-0.15)),
            DiscountMarkupRule::new("NUM_OF_CLAIM > 2", dec!(0.40)),
        ],
    }
}
