use serde::Serialize;

/// Flat record extracted from one book detail page.
///
/// Field order is the order used by the text report and the JSON output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookRecord {
    pub title: String,
    pub price: String,
    pub rating: u8,
    pub stock: u64,
    pub description: String,
    pub upc: String,
    pub product_type: String,
    pub price_excl_tax: String,
    pub price_incl_tax: String,
    pub tax: String,
    pub availability: String,
    pub num_reviews: u32,
}

impl BookRecord {
    pub fn fields(&self) -> [(&'static str, String); 12] {
        [
            ("title", self.title.clone()),
            ("price", self.price.clone()),
            ("rating", self.rating.to_string()),
            ("stock", self.stock.to_string()),
            ("description", self.description.clone()),
            ("upc", self.upc.clone()),
            ("product_type", self.product_type.clone()),
            ("price_excl_tax", self.price_excl_tax.clone()),
            ("price_incl_tax", self.price_incl_tax.clone()),
            ("tax", self.tax.clone()),
            ("availability", self.availability.clone()),
            ("num_reviews", self.num_reviews.to_string()),
        ]
    }
}
