use std::sync::Arc;

use anyhow::Context;
use stockline_core::{ProductId, UserId};
use stockline_inventory::{
    Fulfillment, InMemoryProductRepository, InventoryManager, ProductRepository, SaleRequest,
};
use stockline_products::{NewDigitalProduct, NewPhysicalProduct, Product, ProductFactory};

mod report;
mod settings;

use report::InventoryReport;

fn main() -> anyhow::Result<()> {
    stockline_observability::init();

    let config = settings::load()?;
    let factory = ProductFactory::new(config.clone())?;
    let manager = InventoryManager::new(Arc::new(InMemoryProductRepository::new()), config)?;

    seed(&manager, &factory)?;

    // Duplicate ids are reported and the first product stays.
    let duplicate = factory.physical(NewPhysicalProduct {
        id: "F01".to_string(),
        name: "Duplicate Laptop".to_string(),
        price: 1.0,
        stock: 1,
        weight_kg: 1.0,
        dimensions: "1x1x1 cm".to_string(),
    })?;
    if let Err(err) = manager.register(duplicate.into()) {
        println!("registration rejected: {err}");
    }

    let laptop = ProductId::new("F01")?;
    let ebook = ProductId::new("D01")?;
    let buyer = UserId::new("U1")?;

    manager.activate_license(&ebook, buyer.as_str())?;

    let requests = [
        SaleRequest::new(laptop.clone(), 1).ship_to("Av. Siempre Viva 742, Springfield"),
        SaleRequest::new(ebook.clone(), 1).for_user(buyer.clone()),
        SaleRequest::new(laptop.clone(), 999),
        SaleRequest::new(ebook.clone(), 1).for_user(UserId::new("U2")?),
    ];

    for request in requests {
        match manager.process_sale(request) {
            Ok(outcome) => {
                let c = &outcome.confirmation;
                println!(
                    "sold {} x {} for {:.2} (stock left: {})",
                    c.quantity, c.product_name, c.total, c.remaining_stock
                );
                match &outcome.fulfillment {
                    Fulfillment::Shipment(shipment) => println!("  {shipment}"),
                    Fulfillment::Download(link) => println!("  download: {link}"),
                    Fulfillment::Skipped { reason } => println!("  fulfillment skipped: {reason}"),
                }
            }
            Err(err) => println!("sale rejected: {err}"),
        }
    }

    let estimate = manager.estimate_shipping(&laptop, "Rua Augusta 100, Lisboa")?;
    println!("shipping estimate for {laptop}: {estimate:.2}");

    let products = manager.repository().all_products();
    let report = InventoryReport::new(
        products.iter().map(Product::describe).collect(),
        manager.statistics(),
    );

    println!();
    print!("{}", report.to_text());

    let low: Vec<String> = manager
        .low_stock()
        .iter()
        .map(|p| p.name().to_string())
        .collect();
    if !low.is_empty() {
        println!("low stock: {}", low.join(", "));
    }

    println!();
    println!("{}", report.to_json().context("failed to render JSON report")?);

    tracing::info!(products = manager.repository().count(), "demo finished");
    Ok(())
}

fn seed(
    manager: &InventoryManager<Arc<InMemoryProductRepository>>,
    factory: &ProductFactory,
) -> anyhow::Result<()> {
    let laptop = factory.physical(NewPhysicalProduct {
        id: "F01".to_string(),
        name: "Gaming Laptop".to_string(),
        price: 1500.0,
        stock: 10,
        weight_kg: 2.5,
        dimensions: "40x30x5 cm".to_string(),
    })?;
    let bench = factory.physical(NewPhysicalProduct {
        id: "F02".to_string(),
        name: "Cast Iron Bench".to_string(),
        price: 220.0,
        stock: 4,
        weight_kg: 12.0,
        dimensions: "120x40x45 cm".to_string(),
    })?;
    let ebook = factory.digital(NewDigitalProduct {
        id: "D01".to_string(),
        name: "Clean Code eBook".to_string(),
        price: 30.0,
        stock: 100,
        file_size_mb: 5.0,
        format: "PDF".to_string(),
    })?;

    manager.register(laptop.into())?;
    manager.register(bench.into())?;
    manager.register(ebook.into())?;
    Ok(())
}
