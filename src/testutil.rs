//! Fixtures shared by the unit tests.

use std::fs;
use std::path::Path;

/// Writes `contents` to `dir/relative`, creating parent directories.
pub fn write_file(dir: &Path, relative: &str, contents: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

pub const CONFIG: &str = r#"site:
  base_url: https://example.com/
  title: Example Site
  description: Notes and books
profile:
  name: Ada
  bio: Writes programs.
  location: London
  nickname: ada's notebook
  role: analyst
  status: computing
  work:
    - title: Analyst
      company: Engines Ltd
      period: 1842 - 1843
      url: https://example.com/engines
  projects:
    - name: Notes
      description: Notes on the engine
      url: https://example.com/notes
"#;

/// Lays out a small but complete site under `dir`: a project file, one
/// template per page, two posts, one book of each status and some static
/// assets.
pub fn write_site(dir: &Path) {
    write_file(dir, "quire.yaml", CONFIG);

    write_file(
        dir,
        "templates/index.html",
        "<h1>{{.name}}</h1>{{if .currently_reading}}<p>Reading {{.currently_reading}}</p>{{end}}\
         <pre>{{.ascii_art}}</pre>{{range .work}}<li>{{.company}}</li>{{end}}\
         {{range .projects}}<a href=\"{{.url}}\">{{.name}}</a>{{end}}\
         <p>{{.reading_stats.total_books}} books</p>",
    );
    write_file(
        dir,
        "templates/books.html",
        "{{range .current_books}}<li>{{.title}} {{.progress_percent}}%</li>{{end}}\
         {{range .finished_books}}<li>{{.title}} done</li>{{end}}\
         <p>{{.total_pages_read}} pages</p>",
    );
    write_file(
        dir,
        "templates/blog.html",
        "{{range .posts}}<a href=\"/blog/{{.slug}}\">{{.title}}</a>{{end}}",
    );
    write_file(
        dir,
        "templates/blog-post.html",
        "<h1>{{.post.title}}</h1><span>{{.post.reading_time}}</span>{{.post.content}}",
    );

    write_file(
        dir,
        "content/blog/hello.md",
        "---\ntitle: Hello\ndate: 2024-06-01\nexcerpt: Saying hello\n---\n# Hi\n\nSee https://example.org.\n",
    );
    write_file(
        dir,
        "content/blog/older.md",
        "---\ntitle: Older\ndate: 2024-01-01\n---\nAn older post.\n",
    );
    write_file(
        dir,
        "content/books/reading/dune.md",
        "---\ntitle: Dune\nauthor: Frank Herbert\npages: 400\ncurrent_page: 100\nlast_updated: 2024-06-11\n---\n",
    );
    write_file(
        dir,
        "content/books/finished/emma.md",
        "---\ntitle: Emma\nauthor: Jane Austen\npages: 300\ncurrent_page: 300\nfinished: 2024-02-01\n---\n",
    );

    write_file(dir, "static/css/site.css", "body { margin: 0; }");
    write_file(dir, "static/robots.txt", "User-agent: *\nAllow: /\n");
    write_file(dir, "assets/logo.ascii", "/\\_/\\");
}
