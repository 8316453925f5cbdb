use api_client::{model as domain, BlockingApiClient};
use clap::Parser;
use cursive::{
    event::Key,
    view::{Nameable, Resizable, Scrollable},
    views::{Dialog, EditView, LinearLayout, ListView, SelectView, TextView},
    Cursive,
};
use std::{fmt::Display, process};

use form::BookForm;

mod form;

#[derive(Parser)]
#[command(name = "bookshelf-tui")]
#[command(about = "Browse and edit a bookshelf catalog")]
struct Args {
    #[arg(
        long,
        env = "BOOKSHELF_URL",
        default_value = "http://localhost:8080",
        help = "Base URL of the bookshelf server"
    )]
    base_url: String,
}

#[derive(Clone)]
struct UserInterface {
    api: BlockingApiClient,
}

impl UserInterface {
    fn new(api: BlockingApiClient) -> Self {
        Self { api }
    }

    fn render(self, siv: &mut Cursive) {
        siv.with_theme(|t| t.shadow = false);

        siv.menubar()
            .add_leaf("Books", {
                let ui = self.clone();
                move |siv| ui.show_books(siv)
            })
            .add_leaf("Add", {
                let ui = self.clone();
                move |siv| ui.book_form(siv, None)
            });

        siv.set_autohide_menu(false);

        let list = SelectView::<domain::Book>::new()
            .on_submit({
                let ui = self.clone();
                move |siv, book: &domain::Book| ui.book_options(siv, book)
            })
            .with_name("list")
            .scrollable()
            .full_screen();

        let mut dashboard = LinearLayout::vertical();
        dashboard.add_child(list);
        dashboard.add_child(TextView::new("Q - exit. Esc menubar.").full_width());

        siv.add_fullscreen_layer(dashboard);

        siv.add_global_callback(Key::Esc, |s| s.select_menubar());
        siv.add_global_callback('q', |s| s.quit());
    }

    fn show_books(&self, siv: &mut Cursive) {
        let books = match self.api.get_books() {
            Ok(books) => books,
            Err(error) => return show_error(siv, error),
        };

        if let Some(mut view) = siv.find_name::<SelectView<domain::Book>>("list") {
            view.clear();
            for book in books {
                let label = format!("{} by {}", book.info.title, book.info.author);
                view.add_item(label, book);
            }
        }
    }

    fn book_options(&self, siv: &mut Cursive, book: &domain::Book) {
        let details = format!(
            "{} ({})\nby {}\n\nBook ID {}",
            book.info.title, book.info.year, book.info.author, book.id
        );

        siv.add_layer(
            Dialog::text(details)
                .title("Book")
                .button("Edit", {
                    let ui = self.clone();
                    let book = book.clone();
                    move |s| {
                        s.pop_layer();
                        ui.book_form(s, Some(book.clone()))
                    }
                })
                .button("Delete", {
                    let ui = self.clone();
                    let book = book.clone();
                    move |s| {
                        s.pop_layer();
                        ui.confirm_delete(s, book.clone())
                    }
                })
                .dismiss_button("Close"),
        );
    }

    /// Adds a book when `current` is `None`, edits it otherwise.
    fn book_form(&self, siv: &mut Cursive, current: Option<domain::Book>) {
        let form = current
            .as_ref()
            .map(|book| BookForm::from_book(&book.info))
            .unwrap_or_default();
        let title = if current.is_some() { "Edit book" } else { "Add book" };

        let fields = ListView::new()
            .child("Title", EditView::new().content(form.title).with_name("title"))
            .child("Author", EditView::new().content(form.author).with_name("author"))
            .child("Year", EditView::new().content(form.year).with_name("year"))
            .min_width(40);

        siv.add_layer(
            Dialog::around(fields)
                .title(title)
                .button("Save", {
                    let ui = self.clone();
                    move |s| ui.save(s, current.as_ref())
                })
                .dismiss_button("Cancel"),
        );
    }

    fn save(&self, siv: &mut Cursive, current: Option<&domain::Book>) {
        let form = BookForm {
            title: field_text(siv, "title"),
            author: field_text(siv, "author"),
            year: field_text(siv, "year"),
        };

        let wanted = match form.parse() {
            Ok(info) => info,
            Err(error) => return show_error(siv, error),
        };

        let outcome = match current {
            None => self.api.add_book(&wanted),
            Some(book) => {
                let changes = domain::BookChanges::between(&book.info, wanted);
                if changes.is_empty() {
                    siv.pop_layer();
                    return;
                }
                self.api.update_book(book.id, &changes)
            }
        };

        match outcome {
            Ok(_) => {
                siv.pop_layer();
                self.show_books(siv);
            }
            Err(error) => show_error(siv, error),
        }
    }

    fn confirm_delete(&self, siv: &mut Cursive, book: domain::Book) {
        let question = format!("Delete \"{}\" by {}?", book.info.title, book.info.author);

        siv.add_layer(
            Dialog::text(question)
                .title("Delete book")
                .button("Delete", {
                    let ui = self.clone();
                    move |s| {
                        s.pop_layer();
                        match ui.api.delete_book(book.id) {
                            Ok(_) => ui.show_books(s),
                            Err(error) => show_error(s, error),
                        }
                    }
                })
                .dismiss_button("Cancel"),
        );
    }

    fn start(self) {
        let mut siv = cursive::default();
        let ui = self.clone();
        self.render(&mut siv);
        ui.show_books(&mut siv);
        siv.run();
    }
}

fn field_text(siv: &mut Cursive, name: &str) -> String {
    siv.call_on_name(name, |view: &mut EditView| view.get_content().to_string())
        .unwrap_or_default()
}

fn show_error<E: Display>(siv: &mut Cursive, error: E) {
    siv.add_layer(Dialog::info(error.to_string()).title("Error"));
}

fn main() {
    let args = Args::parse();
    match BlockingApiClient::new(&args.base_url) {
        Ok(api) => UserInterface::new(api).start(),
        Err(error) => {
            eprintln!("Error: {error}");
            process::exit(1);
        }
    }
}
