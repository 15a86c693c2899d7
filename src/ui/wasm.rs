use super::{CanvasMode, UiState, CANVAS_GROUP};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, HtmlCanvasElement, HtmlFieldSetElement, HtmlFormElement, HtmlInputElement,
    HtmlLabelElement, HtmlLegendElement, Node,
};

/// The on-page controls, a form inserted before the canvas
pub struct Ui {
    radios: Vec<(CanvasMode, HtmlInputElement)>,
}

fn element_id(mode: CanvasMode) -> String {
    format!("{}-{}", CANVAS_GROUP, mode.label()).replace(' ', "_")
}

impl Ui {
    pub fn new(document: &Document, canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let form_elem: HtmlFormElement = document.create_element("form")?.dyn_into()?;

        let fieldset_elem: HtmlFieldSetElement = document.create_element("fieldset")?.dyn_into()?;
        fieldset_elem.set_id(CANVAS_GROUP);
        fieldset_elem.set_name(CANVAS_GROUP);

        let legend_elem: HtmlLegendElement = document.create_element("legend")?.dyn_into()?;
        legend_elem.set_inner_text(CANVAS_GROUP);
        fieldset_elem.append_child(&legend_elem)?;

        let mut radios = Vec::with_capacity(CanvasMode::ALL.len());
        for mode in CanvasMode::ALL {
            let (div, input_elem) = Self::create_radio(document, mode)?;
            fieldset_elem.append_child(&div)?;
            radios.push((mode, input_elem));
        }

        form_elem.append_child(&fieldset_elem)?;

        let canvas_node: &Node = canvas;
        match canvas_node.parent_node() {
            Some(parent) => {
                parent.insert_before(&form_elem, Some(canvas_node))?;
            }
            None => {
                let body = document
                    .body()
                    .ok_or_else(|| JsValue::from_str("document has no body"))?;
                body.append_child(&form_elem)?;
            }
        }

        log::debug!("shapegl::ui::Ui::new: created canvas controls");
        Ok(Self { radios })
    }

    fn create_radio(
        document: &Document,
        mode: CanvasMode,
    ) -> Result<(Element, HtmlInputElement), JsValue> {
        let id = element_id(mode);

        let label_elem: HtmlLabelElement = document.create_element("label")?.dyn_into()?;
        label_elem.set_html_for(id.as_str());
        label_elem.set_inner_text(mode.label());

        let input_elem: HtmlInputElement = document.create_element("input")?.dyn_into()?;
        input_elem.set_id(id.as_str());
        input_elem.set_type("radio");
        input_elem.set_name(CANVAS_GROUP);
        input_elem.set_value(mode.label());
        input_elem.set_checked(mode == CanvasMode::default());

        let div = document.create_element("div")?;
        div.set_class_name("inputset");
        div.append_child(&input_elem)?;
        div.append_child(&label_elem)?;

        Ok((div, input_elem))
    }

    /// Read the current control values
    pub fn state(&self) -> UiState {
        let canvas = self
            .radios
            .iter()
            .find(|(_, radio)| radio.checked())
            .map(|&(mode, _)| mode)
            .unwrap_or_default();

        UiState { canvas }
    }
}
