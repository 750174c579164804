use kv_vfs::{Cursor, DirStore, Vfs};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .without_time()
        .compact()
        .init();

    let root = std::env::temp_dir().join("kv_vfs_hello");
    println!("Store dir: {}", root.display());

    // every key of the file system becomes one file in `root`;
    // an empty or foreign store is formatted on open
    let fs = Vfs::new(DirStore::new(&root).unwrap()).unwrap();

    // two independent cursors over the same tree, both start at the root `.`
    let mut writer = fs.cursor();
    let reader = Cursor::open(&fs, ".");

    // creates `./docs` and moves the writer into it
    writer.mkdir("docs").unwrap();
    writer.cd("docs");

    // creates `./docs/first.txt` and stores its payload
    writer.write("first.txt", Some("Hello")).unwrap();

    // `mv` takes absolute paths on both ends
    writer.write("second.txt", Some("World")).unwrap();
    writer.mv("./docs/second.txt", "./second.txt").unwrap();

    let first = writer.read("first.txt").unwrap().unwrap_or_default();
    let second = reader.read("second.txt").unwrap().unwrap_or_default();
    println!("{}, {}!", first, second);

    // removing `docs` from the root moves the writer out of it
    reader.rmdir("docs").unwrap();
    assert_eq!(writer.current_path(), ".");

    // wipe everything this file system stored, so the demo can run again
    reader.format().unwrap();
    println!("Keys left: {:?}", fs.keys().unwrap());
}
