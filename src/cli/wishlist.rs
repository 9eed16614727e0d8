use anyhow::Result;
use clap::Subcommand;
use rust_decimal::Decimal;

use crate::trackers::wishlist::{
    add_item, remove_item, sort_items, toggle_purchased, totals, WishDraft, WishSort, WishlistItem,
};

use super::{
    output::{checkbox, format_money, truncate, Painter},
    Session,
};

#[derive(Subcommand, Debug)]
pub enum WishCommand {
    #[command(about = "List wishlist items")]
    List {
        #[arg(long, value_enum, default_value_t)]
        sort: WishSort,
        #[arg(short, long, help = "Only show this category")]
        category: Option<String>,
    },
    #[command(about = "Add an item to the wishlist")]
    Add {
        name: String,
        price: Decimal,
        #[arg(short, long, default_value = "")]
        category: String,
        #[arg(long, help = "Link to a picture of the item")]
        image: Option<String>,
        #[arg(long, help = "Where to buy it")]
        link: Option<String>,
    },
    #[command(about = "Mark an item as purchased, or not purchased if it already is")]
    Bought { id: u64 },
    #[command(about = "Delete an item")]
    Remove { id: u64 },
    #[command(about = "Show what is left to buy per category")]
    Totals,
}

pub async fn process_wish_command(command: WishCommand, session: &Session) -> Result<()> {
    let mut items = session.open::<WishlistItem>().await?;
    let clock = session.clock.as_ref();
    let painter = &session.painter;
    match command {
        WishCommand::List { sort, category } => {
            let mut selected = items.items().to_vec();
            if let Some(category) = category {
                selected.retain(|v| v.category.eq_ignore_ascii_case(category.trim()));
            }
            sort_items(&mut selected, sort);
            print_items(&selected, painter);
        }
        WishCommand::Add {
            name,
            price,
            category,
            image,
            link,
        } => {
            let draft = WishDraft {
                name,
                price,
                category,
                image_url: image,
                link,
            };
            let id = items.update(|v| Ok(add_item(v, draft, clock)?)).await?;
            println!("Added wishlist item {id}");
        }
        WishCommand::Bought { id } => {
            let purchased = items.update(|v| Ok(toggle_purchased(v, id)?)).await?;
            println!(
                "Item {id} is {}",
                if purchased { "purchased" } else { "wanted again" }
            );
        }
        WishCommand::Remove { id } => {
            let removed = items.update(|v| Ok(remove_item(v, id)?)).await?;
            println!("Removed \"{}\"", removed.name);
        }
        WishCommand::Totals => {
            let totals = totals(items.items());
            for (category, amount) in &totals.by_category {
                println!("{category}\t{}", format_money(*amount));
            }
            println!("{}\t{}", painter.heading("Left to buy"), format_money(totals.remaining));
            println!("{}\t{}", painter.dim("Purchased"), format_money(totals.purchased));
        }
    }
    Ok(())
}

fn print_items(items: &[WishlistItem], painter: &Painter) {
    if items.is_empty() {
        println!("{}", painter.dim("Wishlist is empty"));
        return;
    }
    for item in items {
        print!(
            "{}\t{}\t{}\t{}\t{}",
            item.id,
            checkbox(item.purchased),
            format_money(item.price),
            item.category,
            item.name
        );
        if let Some(link) = item.link.as_ref().or(item.image_url.as_ref()) {
            print!("\t{}", painter.dim(truncate(link, 48)));
        }
        println!();
    }
}

pub fn summary_line(items: &[WishlistItem]) -> String {
    let totals = totals(items);
    let wanted = items.iter().filter(|v| !v.purchased).count();
    format!(
        "{wanted} wanted for {}, {} purchased",
        format_money(totals.remaining),
        items.len() - wanted
    )
}
