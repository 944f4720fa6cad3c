use clap::{Parser, Subcommand, ValueEnum};
use pricebook::goods::read_csv;
use pricebook::{ArrayContainer, Goods, Item, Query};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Maintain a binary price book of groceries, gadgets and services.
#[derive(Parser, Debug)]
#[command(name = "pricebook", version = pricebook::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Build a price book from a `kind,name,price,detail` CSV file
    Import {
        csv: PathBuf,
        out: PathBuf,
        /// Drop rows that cannot be stored (vouchers) instead of failing
        #[arg(long)]
        skip_unsaveable: bool,
    },
    /// Print the book, optionally sorted, filtered or reversed
    List {
        file: PathBuf,
        #[arg(long, value_enum)]
        sort: Option<SortKey>,
        /// Only names containing this text (case-sensitive)
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        reverse: bool,
    },
    /// Show every entry with exactly this name
    Lookup { file: PathBuf, name: String },
    /// Print the sum of all prices
    Total { file: PathBuf },
    /// Delete the entry at a position
    Remove { file: PathBuf, position: usize },
    /// Change one field of the entry at a position
    Set {
        file: PathBuf,
        position: usize,
        field: String,
        value: String,
    },
    /// Reorder the stored book
    Sort {
        file: PathBuf,
        #[arg(long, value_enum, default_value = "price")]
        by: SortKey,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortKey {
    Price,
    Name,
}

/// The book being worked on and where it lives.
struct Session {
    path: PathBuf,
    book: ArrayContainer<Goods>,
}

impl Session {
    fn open(path: &Path) -> pricebook::Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            book: pricebook::deserialize(path)?,
        })
    }

    fn save(&self) -> pricebook::Result<()> {
        pricebook::serialize(&self.book, &self.path)
    }
}

fn import(csv: &Path, out: &Path, skip_unsaveable: bool) -> pricebook::Result<()> {
    let rows = read_csv(File::open(csv)?)?;
    let mut session = Session {
        path: out.to_path_buf(),
        book: ArrayContainer::with_capacity(rows.len()),
    };

    for goods in rows {
        if skip_unsaveable && goods.as_encode().is_none() {
            println!("skipping {} {:?}", goods.kind(), goods.name());
            continue;
        }
        session.book.add(goods)?;
    }
    session.save()?;
    println!("wrote {} entries to {}", session.book.count(), out.display());
    Ok(())
}

fn list(session: &Session, sort: Option<SortKey>, filter: Option<&str>, reverse: bool) {
    let book = &session.book;
    let mut rows: Vec<&Goods> = match (sort, filter) {
        (None, Some(needle)) => book.containing(needle).collect(),
        (None, None) if reverse => book.reversed().collect(),
        (None, None) => book.items().collect(),
        (Some(SortKey::Price), _) => book.sorted_by_price().collect(),
        (Some(SortKey::Name), _) => book.sorted_by_name().collect(),
    };
    if let (Some(_), Some(needle)) = (sort, filter) {
        rows.retain(|goods| goods.name().contains(needle));
    }
    if reverse && (sort.is_some() || filter.is_some()) {
        rows.reverse();
    }

    for (row, goods) in rows.iter().enumerate() {
        println!("{:>4}  {}", row, goods);
    }
    println!("---------------------------");
    println!("{} of {} entries", rows.len(), book.count());
}

fn lookup(session: &Session, name: &str) {
    let hits = session.book.get_by_attribute(name);
    if hits.is_empty() {
        println!("no entry named {:?}", name);
    }
    for goods in hits {
        println!("{}", goods);
    }
}

fn run(cli: Cli) -> pricebook::Result<()> {
    match cli.command {
        Cmd::Import { csv, out, skip_unsaveable } => import(&csv, &out, skip_unsaveable)?,
        Cmd::List { file, sort, filter, reverse } => {
            list(&Session::open(&file)?, sort, filter.as_deref(), reverse)
        }
        Cmd::Lookup { file, name } => lookup(&Session::open(&file)?, &name),
        Cmd::Total { file } => {
            let session = Session::open(&file)?;
            println!("{:.2}", session.book.total_price());
        }
        Cmd::Remove { file, position } => {
            let mut session = Session::open(&file)?;
            let removed = session.book.remove_at(position)?;
            session.save()?;
            println!("removed {}", removed);
        }
        Cmd::Set { file, position, field, value } => {
            let mut session = Session::open(&file)?;
            let count = session.book.count();
            let goods = session
                .book
                .get_mut(position)
                .ok_or_else(|| pricebook::Error::invalid_index(position, count))?;
            goods.set(&field, &value)?;
            println!("{}", goods);
            session.save()?;
        }
        Cmd::Sort { file, by } => {
            let mut session = Session::open(&file)?;
            // Binary-insertion sort lives on the linked container
            let mut list = std::mem::take(&mut session.book).into_linked();
            match by {
                SortKey::Price => list.sort(),
                SortKey::Name => list.sort_by(|a, b| a.name().cmp(b.name())),
            }
            session.book = list.into_array();
            session.save()?;
            println!("sorted {} entries by {:?}", session.book.count(), by);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error[{}]: {}", err.category(), err);
            ExitCode::FAILURE
        }
    }
}
