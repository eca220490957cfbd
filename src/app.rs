use crate::{
    TRANSLATIONS,
    config::AnnotatorConfig,
    molecule_render::{DefaultRenderer, MoleculeImage},
    persister::RecordEdit,
    record_view::{MoleculePanel, RecordView},
    session::Session,
};
use eframe::egui::{self, Color32, TextureHandle, Ui};
use tracing::{error, info};

const IMAGE_DISPLAY_WIDTH: f32 = 400.0;

/// Editable copies of the current record's fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct EditorFields {
    total_entity: i64,
    error_entity: i64,
    section_values: Vec<String>,
}

impl EditorFields {
    fn from_view(view: &RecordView) -> Self {
        Self {
            total_entity: view.total_entity,
            error_entity: view.error_entity,
            section_values: view.section_values.clone(),
        }
    }

    fn to_edit(&self) -> RecordEdit {
        RecordEdit {
            total_entity: self.total_entity,
            error_entity: self.error_entity,
            section_values: self.section_values.clone(),
        }
    }
}

#[derive(Default)]
struct PanelTextures {
    source: Option<TextureHandle>,
    target: Option<TextureHandle>,
}

pub struct AnnotatorApp {
    config: AnnotatorConfig,
    session: Session,
    renderer: DefaultRenderer,
    view: RecordView,
    editor: EditorFields,
    textures: PanelTextures,
    textures_stale: bool,
    status: String,
}

impl AnnotatorApp {
    pub fn new(config: AnnotatorConfig, session: Session) -> Self {
        let renderer = DefaultRenderer::default();
        let view = session.current_view(&renderer);
        Self {
            config,
            editor: EditorFields::from_view(&view),
            session,
            renderer,
            view,
            textures: PanelTextures::default(),
            textures_stale: true,
            status: String::new(),
        }
    }

    fn show_view(&mut self, view: RecordView) {
        self.editor = EditorFields::from_view(&view);
        self.view = view;
        self.textures_stale = true;
    }

    fn on_navigate(&mut self, delta: isize) {
        let view = self.session.navigate(delta, &self.renderer);
        self.show_view(view);
    }

    fn on_save(&mut self) {
        match self.session.save_current(&self.editor.to_edit()) {
            Ok(report) => self.status = report.message,
            Err(e) => {
                error!(error = %e, "save failed");
                self.status = e.to_string();
            }
        }
    }

    fn open_dataset_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
        else {
            return;
        };
        let config = AnnotatorConfig {
            data_path: path,
            ..self.config.clone()
        };
        match Session::open(&config) {
            Ok(session) => {
                info!(path = %config.data_path.display(), "opened dataset");
                self.config = config;
                self.session = session;
                let view = self.session.current_view(&self.renderer);
                self.show_view(view);
                self.status.clear();
            }
            Err(e) => {
                error!(error = %e, "could not open dataset");
                self.status = e.to_string();
            }
        }
    }

    fn load_texture(
        ctx: &egui::Context,
        name: &str,
        image: Option<&MoleculeImage>,
    ) -> Option<TextureHandle> {
        let image = image?;
        let color_image =
            egui::ColorImage::from_rgba_unmultiplied(image.size(), image.pixels().as_raw());
        Some(ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR))
    }

    fn refresh_textures(&mut self, ctx: &egui::Context) {
        if !self.textures_stale {
            return;
        }
        self.textures = PanelTextures {
            source: Self::load_texture(ctx, "source_molecule", self.view.source.image.as_ref()),
            target: Self::load_texture(ctx, "target_molecule", self.view.target.image.as_ref()),
        };
        self.textures_stale = false;
    }

    fn render_menu_bar(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.menu_button(TRANSLATIONS.get("m_file"), |ui| {
                if ui.button(TRANSLATIONS.get("m_open")).clicked() {
                    self.open_dataset_dialog();
                }
                if ui.button(TRANSLATIONS.get("m_quit")).clicked() {
                    ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });
            ui.separator();
            ui.label(format!(
                "{} {} / {}  ({})",
                TRANSLATIONS.get("l_record"),
                self.view.index + 1,
                self.session.len(),
                self.config.data_path.display()
            ));
        });
    }

    fn render_molecule_panel(
        ui: &mut Ui,
        panel: &MoleculePanel,
        texture: Option<&TextureHandle>,
        image_label: &str,
        text_label: &str,
    ) {
        ui.vertical(|ui| {
            ui.strong(image_label);
            if let Some(texture) = texture {
                ui.add(
                    egui::Image::new(egui::load::SizedTexture::from_handle(texture))
                        .max_width(IMAGE_DISPLAY_WIDTH),
                );
            }
            if let Some(warning) = &panel.warning {
                ui.colored_label(Color32::from_rgb(180, 45, 45), warning.as_str());
            }
            ui.label(text_label);
            let mut structure = panel.structure.clone();
            ui.add(
                egui::TextEdit::singleline(&mut structure)
                    .interactive(false)
                    .desired_width(IMAGE_DISPLAY_WIDTH),
            );
        });
    }

    fn render_molecules(&self, ui: &mut Ui) {
        ui.columns(2, |columns| {
            Self::render_molecule_panel(
                &mut columns[0],
                &self.view.source,
                self.textures.source.as_ref(),
                &TRANSLATIONS.get("l_source"),
                &TRANSLATIONS.get("l_source_text"),
            );
            Self::render_molecule_panel(
                &mut columns[1],
                &self.view.target,
                self.textures.target.as_ref(),
                &TRANSLATIONS.get("l_target"),
                &TRANSLATIONS.get("l_target_text"),
            );
        });
    }

    fn render_counters(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.label(TRANSLATIONS.get("l_total_entity"));
            ui.add(egui::DragValue::new(&mut self.editor.total_entity));
            ui.add_space(24.0);
            ui.label(TRANSLATIONS.get("l_error_entity"));
            ui.add(egui::DragValue::new(&mut self.editor.error_entity));
        });
    }

    fn render_sections(&mut self, ui: &mut Ui) {
        for (name, value) in self
            .view
            .sections
            .iter()
            .zip(self.editor.section_values.iter_mut())
        {
            ui.label(name.as_str());
            ui.add(
                egui::TextEdit::multiline(value)
                    .desired_rows(3)
                    .desired_width(f32::INFINITY),
            );
        }
    }

    fn render_controls(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            let previous = ui.add_enabled(
                self.session.has_previous(),
                egui::Button::new(TRANSLATIONS.get("b_previous")),
            );
            if previous.clicked() {
                self.on_navigate(-1);
            }
            if ui.button(TRANSLATIONS.get("b_save")).clicked() {
                self.on_save();
            }
            let next = ui.add_enabled(
                self.session.has_next(),
                egui::Button::new(TRANSLATIONS.get("b_next")),
            );
            if next.clicked() {
                self.on_navigate(1);
            }
        });
        ui.horizontal(|ui| {
            ui.label(format!("{}:", TRANSLATIONS.get("l_status")));
            ui.label(self.status.as_str());
        });
    }
}

impl eframe::App for AnnotatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.refresh_textures(ctx);

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            self.render_menu_bar(ui);
        });

        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
            self.render_controls(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.render_molecules(ui);
                ui.separator();
                self.render_counters(ui);
                ui.separator();
                self.render_sections(ui);
            });
        });
    }

    fn ui(&mut self, _ui: &mut egui::Ui, _frame: &mut eframe::Frame) {}
}
