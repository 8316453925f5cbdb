use anyhow::Result;
use clap::Parser;
use std::{
    io::{BufRead, Write},
    process,
};
use time::OffsetDateTime;

use api_client::{model as domain, ApiClient};
use prompt::Prompt;

pub mod model;
pub mod prompt;

#[derive(Parser)]
#[command(name = "bookshelf")]
#[command(about = "Create, read, update and delete books in a bookshelf catalog")]
struct CliArgs {
    #[arg(
        long,
        env = "BOOKSHELF_URL",
        default_value = "http://localhost:8080",
        help = "Base URL of the bookshelf server"
    )]
    base_url: String,

    #[command(subcommand)]
    command: model::Command,
}

struct BookServiceApi(ApiClient);

impl BookServiceApi {
    fn new(client: ApiClient) -> Self {
        Self(client)
    }

    async fn dispatch<R, W>(
        &self,
        command: model::Command,
        prompt: &mut Prompt<R, W>,
    ) -> Result<()>
    where
        R: BufRead,
        W: Write,
    {
        let Self(client) = self;
        match command {
            model::Command::Fetch => {
                let books = client.get_books().await?;
                if books.is_empty() {
                    println!("No books found");
                } else {
                    println!("{}", model::book_table(books));
                }
                Ok(())
            }
            model::Command::Show { id } => {
                let book = client.get_book(id.parse::<domain::BookId>()?).await?;
                println!("{}", model::Book::from(book));
                Ok(())
            }
            model::Command::Create(draft) => {
                let this_year = OffsetDateTime::now_utc().year();
                let book = client.add_book(&draft.complete(prompt, this_year)?).await?;
                println!("Book created successfully:");
                println!("{}", model::Book::from(book));
                Ok(())
            }
            model::Command::Update { id, draft } => {
                let Some(current) = self.existing_book(id, prompt).await? else {
                    return Ok(());
                };

                let wanted = draft.amend(prompt, &current.info)?;
                let changes = domain::BookChanges::between(&current.info, wanted);
                if changes.is_empty() {
                    println!("Nothing to change");
                    return Ok(());
                }

                let book = client.update_book(current.id, &changes).await?;
                println!("Book updated successfully:");
                println!("{}", model::Book::from(book));
                Ok(())
            }
            model::Command::Delete { id } => {
                if let Some(book) = self.existing_book(id, prompt).await? {
                    client.delete_book(book.id).await?;
                    println!("Book with ID {} deleted successfully", book.id);
                }
                Ok(())
            }
        }
    }

    /// Looks the book up before anything is asked about it. `None` once the
    /// user has been told it does not exist.
    async fn existing_book<R, W>(
        &self,
        id: Option<String>,
        prompt: &mut Prompt<R, W>,
    ) -> Result<Option<domain::Book>>
    where
        R: BufRead,
        W: Write,
    {
        let Self(client) = self;
        let id: domain::BookId = match id {
            Some(id) => id.parse()?,
            None => prompt.text("Enter book ID", None)?.parse()?,
        };

        match client.get_book(id).await {
            Ok(book) => Ok(Some(book)),
            Err(error) if error.is_not_found() => {
                eprintln!("Error: Book not found.");
                eprintln!("Hint: Use the 'fetch' command to see available book IDs.");
                Ok(None)
            }
            Err(error) => Err(error.into()),
        }
    }
}

async fn run(args: CliArgs) -> Result<()> {
    let client = ApiClient::new(&args.base_url)?;
    BookServiceApi::new(client)
        .dispatch(args.command, &mut Prompt::stdio())
        .await
}

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    if let Err(error) = run(args).await {
        eprintln!("Error: {error}");
        process::exit(1);
    }
}
