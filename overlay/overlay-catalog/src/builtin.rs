//! Compiled-in demo catalog.

use crate::record::ProductRecord;

/// `(id, name, price, manufacturer, manufactured, expires, ingredients)`
type Row = (
    &'static str,
    &'static str,
    f64,
    &'static str,
    &'static str,
    &'static str,
    &'static [&'static str],
);

const ROWS: &[Row] = &[
    ("1234567890123", "Whole Milk", 3.49, "DairyFresh Inc.", "2025-01-10", "2025-03-10", &["milk", "vitamin d"]),
    ("2345678901234", "White Bread", 2.29, "Golden Bake Ltd.", "2025-02-01", "2025-04-15", &["wheat flour", "water", "yeast", "salt"]),
    ("3456789012345", "Chicken Breast", 8.99, "Fresh Farms Meat", "2025-02-05", "2025-02-20", &["chicken"]),
    ("4567890123456", "Rice (5kg)", 12.50, "Harvest Grains", "2024-12-15", "2025-12-15", &["rice"]),
    ("5678901234567", "Apple Juice", 7.79, "Fruity Beverages", "2025-01-20", "2025-06-20", &["apple juice", "vitamin c"]),
    ("6789012345678", "Salted Butter", 5.29, "Creamy Dairy", "2025-01-18", "2025-04-18", &["butter", "salt"]),
    ("7890123456789", "Corn Flakes", 6.49, "Crunchy Cereals", "2025-01-12", "2025-07-12", &["corn", "sugar", "malted wheat extract"]),
    ("8901234567890", "Instant Noodles", 1.29, "QuickEats Ltd.", "2025-02-08", "2026-02-08", &["wheat flour", "palm oil", "beef flavouring"]),
    ("9012345678901", "Dishwashing Liquid", 3.99, "Sparkle Clean", "2025-01-05", "2027-01-05", &["surfactants", "water"]),
    ("1122334455667", "Shampoo", 7.99, "HairCare Co.", "2024-12-20", "2027-12-20", &["water", "sodium laureth sulfate"]),
    ("2233445566778", "Toothpaste", 2.99, "FreshSmile Corp.", "2024-11-25", "2026-11-25", &["sodium fluoride", "calcium carbonate"]),
    ("3344556677889", "Laundry Detergent", 9.99, "BrightWash Ltd.", "2025-01-15", "2027-01-15", &["surfactants", "enzymes"]),
    ("4455667788990", "Frozen Peas", 3.49, "GreenHarvest", "2025-01-02", "2026-01-02", &["peas"]),
    ("5566778899001", "Cheddar Cheese", 5.79, "DairyGoodness", "2025-02-03", "2025-05-03", &["cheese", "milk", "salt"]),
    ("6677889900112", "Tomato Ketchup", 2.89, "SaucyFoods Inc.", "2024-12-28", "2026-12-28", &["tomato", "vinegar", "sugar"]),
    ("7788990011223", "Olive Oil", 10.49, "Mediterranean Gold", "2024-11-15", "2026-11-15", &["olive oil"]),
    ("8899001122334", "Canned Tuna", 3.99, "Ocean Delights", "2024-10-30", "2027-10-30", &["tuna", "water", "salt"]),
    ("9900112233445", "Chocolate Bar", 1.79, "SweetTreats Ltd.", "2025-01-22", "2026-01-22", &["cocoa", "sugar", "milk powder"]),
    ("1001223344556", "Bottled Water", 1.49, "PureSpring Water", "2025-02-10", "2027-02-10", &["water"]),
    ("1102334455667", "Coffee Beans", 14.99, "Aroma Roasters", "2024-12-05", "2025-12-05", &["coffee"]),
    ("5449000000996", "Test product", 1.00, "Test Company", "2024-12-28", "2025-12-28", &[]),
];

pub(crate) fn records() -> impl Iterator<Item = ProductRecord> {
    ROWS.iter().map(
        |&(id, name, price, manufacturer, manufactured, expires, ingredients)| {
            ProductRecord::new(id, name, price)
                .with_manufacturer(manufacturer)
                .with_dates(manufactured, expires)
                .with_ingredients(ingredients.iter().copied())
        },
    )
}
