use rustyline::DefaultEditor;
use tracing::Level;

use uts46::*;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .init();

    let mut rl = DefaultEditor::new().expect("Failed to init editor");
    let transitional = Config::new().processing(Processing::Transitional);

    while let Ok(ref line) = rl.readline(">> ") {
        let mut chars = line.chars();
        if let Some(c) = chars.next() {
            if chars.next().is_none() {
                println!("Mapping::of({c:?}) == {:?}", Mapping::of(c));
            }
        }

        let unicode = to_unicode(line);
        println!("to_unicode({line}) == {} {}", unicode.value, unicode.status);
        let ascii = to_ascii(line, Processing::Nontransitional);
        println!("to_ascii_n({line}) == {} {}", ascii.value, ascii.status);
        let ascii = transitional.to_ascii(line);
        println!("to_ascii_t({line}) == {} {}", ascii.value, ascii.status);
        println!("punycode::encode({line}) == {:?}", punycode::encode(line));
        println!("punycode::decode({line}) == {:?}", punycode::decode(line));
        rl.add_history_entry(line).expect("Failed to save history");
    }
}
