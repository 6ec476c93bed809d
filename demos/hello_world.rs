use portable_fs::{Fs, path};

fn main() {
    let fs = Fs::new();

    let mut buf = [0u8; 1024];
    let Some(cwd) = fs.current_dir(&mut buf) else {
        eprintln!("cannot read the current directory");
        return;
    };
    println!("Current dir: {}", String::from_utf8_lossy(cwd.of(&buf)));

    let root = std::env::temp_dir().join("portable_fs_demo");

    // creates the directory; a second call would also return true
    if !fs.make_dir(&root) {
        eprintln!("cannot create {}", root.display());
        return;
    }

    let hello = root.join("hello.txt");
    fs.write_file(&hello, b"Hello");
    fs.copy_file(&hello, root.join("copy.txt"));

    // whole file, allocated through the context hooks
    let content = fs.read_file(&hello).unwrap();
    println!("{} bytes: {}", content.len(), String::from_utf8_lossy(&content));

    // caller-owned buffer: the return value is the true size
    let mut small = [0u8; 3];
    let size = fs.read_file_buffer(&hello, &mut small).unwrap();
    println!("size {size}, truncated to {:?}", &small[..2]);

    // list the directory, pseudo entries included
    let mut cursor = fs.open_dir(&root).unwrap();
    while let Some(entry) = cursor.read() {
        println!("  {}", String::from_utf8_lossy(entry.name()));
    }
    cursor.close();

    let full = hello.to_string_lossy();
    println!(
        "dirname: {}, basename: {}",
        String::from_utf8_lossy(path::dirname(full.as_bytes())),
        String::from_utf8_lossy(path::basename(full.as_bytes())),
    );

    fs.delete_file(&hello);
    fs.delete_file(root.join("copy.txt"));
    fs.delete_dir(&root);
}
