use std::sync::LazyLock;

use crate::{
    dto::products::ProductList,
    error::{AppError, AppResult},
    models::{Product, ProductCategory},
    response::{ApiResponse, Meta},
};

/// The shop catalog. Products are not editable at runtime.
static CATALOG: LazyLock<Vec<Product>> = LazyLock::new(|| {
    let product = |id, name: &str, image: &str, price: &str, description: &str, category| Product {
        id,
        name: name.to_string(),
        image: image.to_string(),
        price: price.to_string(),
        description: description.to_string(),
        category,
    };
    vec![
        product(
            101,
            "Café de Origen Único Etiopía",
            "https://images.unsplash.com/photo-1559056199-641a0ac8b55e?auto=format&fit=crop&w=800&q=80",
            "18.99",
            "Bolsa de 300g con notas florales, acidez cítrica y cuerpo ligero. Tueste medio.",
            ProductCategory::Grano,
        ),
        product(
            102,
            "Prensa Francesa Clásica (1L)",
            "https://images.unsplash.com/photo-1708127368781-cd5f069a90a5?auto=format&fit=crop&w=687&q=80",
            "34.50",
            "Ideal para inmersión. Vidrio borosilicato y marco de acero inoxidable.",
            ProductCategory::Cafeteras,
        ),
        product(
            103,
            "Máquina Espresso Portátil Wacaco",
            "https://ae-pic-a1.aliexpress-media.com/kf/S963599af4b8746b4a5f9792781d82c0bA.jpg_640x640q75.jpg_.avif",
            "69.00",
            "Perfecta para viajes. Espresso con 8 bares de presión manual.",
            ProductCategory::Maquinas,
        ),
        product(
            104,
            "Molino Manual Cónico (Acero)",
            "https://ae-pic-a1.aliexpress-media.com/kf/S43492f3905294fee9f067da86e5e07f0f.jpg_640x640q75.jpg_.avif",
            "49.99",
            "Muelas de cerámica ajustables para molienda fina a gruesa. Diseño robusto.",
            ProductCategory::Molinos,
        ),
        product(
            105,
            "V60 Dripper (Cerámica)",
            "https://ae-pic-a1.aliexpress-media.com/kf/S28b43a1511bc4468861600ecdffa7ca5f.jpg_960x960q75.jpg_.avif",
            "24.00",
            "Método de filtrado rápido y limpio. Resalta las notas de los cafés claros.",
            ProductCategory::Accesorios,
        ),
    ]
});

pub fn catalog() -> &'static [Product] {
    &CATALOG
}

pub fn list_products() -> ApiResponse<ProductList> {
    let items = catalog().to_vec();
    let meta = Meta::total(items.len());
    ApiResponse::success("Ok", ProductList { items }, Some(meta))
}

pub fn get_product(id: i64) -> AppResult<ApiResponse<Product>> {
    let product = catalog()
        .iter()
        .find(|p| p.id == id)
        .cloned()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Ok", product, Some(Meta::empty())))
}
