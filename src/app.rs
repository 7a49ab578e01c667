//! Demo application for the mathdown editor widget
//!
//! Hosts one editor in a window, keeps the saved document in the app and
//! offers a read-only switch and a sample document to exercise the widget.

use eframe::egui;
use log::{debug, info, warn};
use mathdown::{
    save_config, EditorSettings, EditorStyle, MarkdownEditor, MarkdownEditorState, PreviewStyle,
};

const SAMPLE_DOCUMENT: &str = r#"# Math in Markdown

Inline math like $E = mc^2$ flows with the text, while display math gets
its own line:

$$\int_0^1 x^2 \, dx = \frac{1}{3}$$

- Press **Edit** to change the document as HTML
- Press **Save** to convert it back to markdown

```rust
fn main() {
    println!("hello");
}
```
"#;

pub struct DemoApp {
    editor: MarkdownEditorState,
    /// The host's copy of the document, fed back to the editor each frame
    document: String,
    read_only: bool,
    /// Settings as loaded, written back when the read-only switch changes
    settings: EditorSettings,
    editor_style: EditorStyle,
    preview_style: PreviewStyle,
    syntax_theme: String,
    saves: usize,
}

impl DemoApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: EditorSettings) -> Self {
        let document = if settings.initial_content.is_empty() {
            SAMPLE_DOCUMENT.to_string()
        } else {
            settings.initial_content.clone()
        };
        let editor_settings = EditorSettings {
            initial_content: document.clone(),
            ..settings.clone()
        };

        let editor = MarkdownEditorState::from_settings(&editor_settings)
            .on_content_change(|markdown| debug!("Content changed ({} bytes)", markdown.len()));

        Self {
            editor,
            document,
            read_only: settings.read_only,
            editor_style: settings.editor_style(),
            preview_style: settings.preview_style(),
            syntax_theme: settings.syntax_theme.clone(),
            saves: 0,
            settings,
        }
    }
}

impl eframe::App for DemoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("demo_toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.checkbox(&mut self.read_only, "Read-only").changed() {
                    self.settings.read_only = self.read_only;
                    if let Err(e) = save_config(&self.settings) {
                        warn!("Failed to save configuration: {}", e);
                    }
                }
                if ui.button("Load sample").clicked() {
                    info!("Loading sample document");
                    self.document = SAMPLE_DOCUMENT.to_string();
                }
                ui.separator();
                ui.label(format!("Saves: {}", self.saves));
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let output = MarkdownEditor::new(&mut self.editor)
                .initial_content(&self.document)
                .read_only(self.read_only)
                .editor_style(self.editor_style.clone())
                .preview_style(self.preview_style.clone())
                .syntax_theme(&self.syntax_theme)
                .show(ui);

            if let Some(markdown) = output.saved() {
                info!("Document saved ({} bytes)", markdown.len());
                self.document = markdown.to_string();
                self.saves += 1;
            }
        });
    }
}
