use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct BannerProps {
    pub text: String,
    pub visible: bool,
}

/// Single-text caption display. Shows the intro message until the idle
/// window fades it, then resurfaces with club names on marker hover/click.
#[function_component(Banner)]
pub fn banner(props: &BannerProps) -> Html {
    let opacity = if props.visible { "1" } else { "0" };
    html! {
        <div id="banner" style={format!("position:absolute; top:18px; left:50%; transform:translateX(-50%); background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:8px 18px; font-size:16px; pointer-events:none; transition:opacity 0.4s; opacity:{};", opacity)}>
            { &props.text }
        </div>
    }
}
