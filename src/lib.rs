#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # Bistro Batch

 CSV import and export for restaurant management data: stock, menu, staff,
 tables and orders.

 Files are parsed into ordered records, checked for the columns the target
 type needs, mapped field by field into typed domain values and committed
 only when the whole file made it through. Exports go the other way, in a
 fixed column order per type.

 ## Core Concepts

- **Record:** an ordered set of named values, one per CSV column.
- **Step:** reads records, maps each one, and stages the results chunk by
  chunk. Records failing coercion are counted against a skip limit.
- **ItemReader:** yields records one at a time, here from CSV text.
- **ItemProcessor:** turns one record into a domain value, or explains which
  fields could not be converted.
- **ItemWriter:** receives chunks of values: a CSV stream, an in-memory
  staging area, or the log.
- **FileTransfer:** the boundary where user-selected files are read and
  generated files are saved.

 ## Features

| **Feature** | **Description**                                                  |
|-------------|------------------------------------------------------------------|
| transfer    | Enables `LocalFileTransfer`, reading and saving files with tokio |
| logger      | Enables a logger `ItemWriter`, useful for debugging purposes     |
| full        | Enables all available features                                   |

 ## Getting Started

```toml
[dependencies]
bistro-batch = { version = "<version>", features = ["full"] }
```

Importing a stock sheet, with one bad row tolerated:

```rust
# use bistro_batch::{
#     domain::inventory::{self, NewInventoryItem},
#     error::ImportError,
#     import::CsvImport,
# };
fn main() -> Result<(), ImportError> {
    let csv = "nome,categoria,quantidade,unidade,estoqueMinimo,preco
        Arroz,Grãos,20,kg,5,4.50
        Feijão,Grãos,muitos,kg,5,7.20
        Leite,Laticínios,12,L,6,4.99";

    let outcome = CsvImport::<NewInventoryItem>::builder()
        .name("estoque")
        .skip_limit(1)
        .build()
        .import_text(csv)?;

    assert_eq!(outcome.skipped.len(), 1);

    let stock = inventory::add_items(Vec::new(), outcome.items);
    assert_eq!(stock.len(), 2);
    assert_eq!(inventory::low_stock(&stock).len(), 0);

    Ok(())
}
```
 */

/// Record model, item traits and the import step
pub mod core;

/// Error types
pub mod error;

#[doc(inline)]
pub use error::*;

/// Items readers / writers (csv, in-memory staging, logger) and record mapping
pub mod item;

/// Reading selected files and saving exports
pub mod transfer;

/// Import and export flows tying the pieces together
pub mod import;

/// Restaurant domain values and their state updates
pub mod domain;
