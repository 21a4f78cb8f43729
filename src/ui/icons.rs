//! Inline SVG icons used by the viewer overlay and info panel.

pub const APERTURE: &str = r#"<svg class="obsidium-info-svg-small" xmlns="http://www.w3.org/2000/svg" width="256" height="256" viewBox="0 0 256 256"><path fill="currentColor" d="M200.12 55.88A102 102 0 0 0 55.87 200.12A102 102 0 1 0 200.12 55.88m-102 66.67l19.65-23.14l29.86 5.46l10.21 28.58l-19.65 23.14l-29.86-5.46Zm111.81-31.86a90.24 90.24 0 0 1-2 78.63l-56.14-10.24Zm-6.16-11.28l-36.94 43.48l-30.17-84.47a89.3 89.3 0 0 1 55 25.94a91.3 91.3 0 0 1 12.11 15.05m-139.41-15a89.37 89.37 0 0 1 59.45-26.31L143 91.82L54.75 75.71a91 91 0 0 1 9.61-11.35ZM48 86.68l56.14 10.24l-58.07 68.39a90.24 90.24 0 0 1 2-78.63Zm4.21 89.91l36.94-43.48l30.17 84.47a89.3 89.3 0 0 1-55-25.94a91.3 91.3 0 0 1-12.09-15.05Zm139.41 15a89.32 89.32 0 0 1-59.45 26.26L113 164.18l88.24 16.11a91 91 0 0 1-9.6 11.35Z"/></svg>"#;
pub const EXPOSURE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><path fill="currentColor" d="M11.98 16.52q0-1.01.415-1.884q.415-.872 1.113-1.495l1.938 3.378zm2.27 3.876q-.829-.467-1.406-1.23q-.577-.764-.782-1.743h3.902zm1.714-4.78l-1.714-2.993q.517-.286 1.075-.455T16.5 12q.367 0 .716.066q.35.065.686.19zm.536 5.403q-.367 0-.726-.065q-.358-.066-.695-.19l1.938-3.341l1.733 2.973q-.517.287-1.075.455t-1.175.168m.517-5.403l1.733-2.993q.829.468 1.396 1.24q.568.774.773 1.753zm2.456 4.263l-1.939-3.36H21q0 1.01-.412 1.873t-1.115 1.487m.148-10.263h-1.036q-.727-2.027-2.504-3.322T12 5Q9.075 5 7.038 7.038T5 12q0 2.108 1.11 3.79Q7.222 17.474 9 18.309V15h1v5H5v-1h3.312q-1.916-1-3.114-2.851T4 12q0-1.664.626-3.118T6.34 6.34t2.542-1.714T12 4q2.706 0 4.778 1.584q2.072 1.583 2.843 4.032"/></svg>"#;
pub const ISO: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="32" height="32" viewBox="0 0 32 32"><path fill="currentColor" d="M24 21h-3a2 2 0 0 1-2-2v-6a2 2 0 0 1 2-2h3a2 2 0 0 1 2 2v6a2 2 0 0 1-2 2m-3-8v6h3v-6zm-6 8h-5v-2h5v-2h-3a2 2 0 0 1-2-2v-2a2 2 0 0 1 2-2h5v2h-5v2h3a2 2 0 0 1 2 2v2a2 2 0 0 1-2 2M6 11h2v10H6z"/><path fill="currentColor" d="M28 6H4a2 2 0 0 0-2 2v16a2 2 0 0 0 2 2h24a2 2 0 0 0 2-2V8a2 2 0 0 0-2-2M4 24V8h24v16Z"/></svg>"#;
pub const FOCAL_LENGTH: &str = r#"<svg class="obsidium-info-svg-small" xmlns="http://www.w3.org/2000/svg" width="2048" height="2048" viewBox="0 0 2048 2048"><path fill="currentColor" d="M1344 768q-26 0-45-19t-19-45t19-45t45-19t45 19t19 45t-19 45t-45 19m595 1133l-263-262q-43 42-87 79t-95 69l151 152l-90 90l-182-179q-167 70-349 70q-105 0-205-23t-192-69t-170-110t-144-149l-204 204l-90-90l222-223q-57-99-85-210t-28-226q0-124 32-238t90-214t140-181t181-140t214-91t239-32t238 32t214 90t181 140t140 181t91 214t32 239q0 139-41 270t-122 245l272 272zM256 1024q0 89 20 175t60 166l368-367l384 384l256-256l321 321q62-95 94-202t33-221q0-106-27-204t-78-183t-120-156t-155-120t-184-77t-204-28t-204 27t-183 78t-156 120t-120 155t-77 184t-28 204m768 768q129 0 251-42l-571-572l-299 300q54 74 123 132t148 98t168 62t180 22m376-99q52-29 98-65t87-80l-241-242l-166 166z"/></svg>"#;
pub const DIMENSIONS: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="32" height="32" viewBox="0 0 32 32"><path fill="currentColor" d="m22 11l-1.41 1.41L23.17 15H8.83l2.58-2.59L10 11l-5 5l5 5l1.41-1.41L8.83 17h14.34l-2.58 2.59L22 21l5-5z"/><path fill="currentColor" d="M28 30H4a2 2 0 0 1-2-2V4a2 2 0 0 1 2-2h24a2 2 0 0 1 2 2v24a2 2 0 0 1-2 2M4 4v24h24V4Z"/></svg>"#;
pub const CAMERA: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="512" height="512" viewBox="0 0 512 512"><path fill="none" stroke="currentColor" stroke-linecap="round" stroke-linejoin="round" stroke-width="32" d="m350.54 148.68l-26.62-42.06C318.31 100.08 310.62 96 302 96h-92c-8.62 0-16.31 4.08-21.92 10.62l-26.62 42.06C155.85 155.23 148.62 160 140 160H80a32 32 0 0 0-32 32v192a32 32 0 0 0 32 32h352a32 32 0 0 0 32-32V192a32 32 0 0 0-32-32h-59c-8.65 0-16.85-4.77-22.46-11.32"/><circle cx="256" cy="272" r="80" fill="none" stroke="currentColor" stroke-miterlimit="10" stroke-width="32"/><path fill="none" stroke="currentColor" stroke-linecap="round" stroke-linejoin="round" stroke-width="32" d="M124 158v-22h-24v22"/></svg>"#;
pub const LENS: &str = r#"<svg class="obsidium-info-svg-small" xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><g fill="none" stroke="currentColor" stroke-linecap="round" stroke-linejoin="round" stroke-width="1.5"><path d="M12 22c5.523 0 10-4.477 10-10S17.523 2 12 2S2 6.477 2 12s4.477 10 10 10"/><path d="M17.197 9q-.15-.259-.323-.5m.937 5a6.01 6.01 0 0 1-4.311 4.311"/></g></svg>"#;
pub const LOCATION: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><g fill="none" stroke="currentColor" stroke-width="1.5"><path stroke-linecap="round" stroke-linejoin="round" d="M18.91 18c.915 1.368 1.301 2.203.977 2.9q-.06.128-.14.247c-.575.853-2.06.853-5.03.853H9.283c-2.97 0-4.454 0-5.029-.853a2 2 0 0 1-.14-.247c-.324-.697.062-1.532.976-2.9"/><path d="M15 9.5a3 3 0 1 1-6 0a3 3 0 0 1 6 0Z"/><path d="M12 2c4.059 0 7.5 3.428 7.5 7.587c0 4.225-3.497 7.19-6.727 9.206a1.55 1.55 0 0 1-1.546 0C8.003 16.757 4.5 13.827 4.5 9.587C4.5 5.428 7.941 2 12 2Z"/></g></svg>"#;

pub const CLOSE_BUTTON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><path fill="none" stroke="currentColor" stroke-dasharray="12" stroke-dashoffset="12" stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="M12 12l7 7M12 12l-7 -7M12 12l-7 7M12 12l7 -7"><animate fill="freeze" attributeName="stroke-dashoffset" dur="0.3s" values="12;0"/></path></svg>"#;
pub const PREV_BUTTON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="20" viewBox="0 0 20 20"><path fill="currentColor" d="m4 10l9 9l1.4-1.5L7 10l7.4-7.5L13 1z"/></svg>"#;
pub const NEXT_BUTTON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="20" viewBox="0 0 20 20"><path fill="currentColor" d="M7 1L5.6 2.5L13 10l-7.4 7.5L7 19l9-9z"/></svg>"#;
pub const ZOOM_IN_BUTTON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><g fill="none" stroke="currentColor" stroke-linecap="round" stroke-linejoin="round" stroke-width="2"><circle cx="11" cy="11" r="8"/><path d="m21 21l-4.35-4.35M11 8v6m-3-3h6"/></g></svg>"#;
pub const ZOOM_OUT_BUTTON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><g fill="none" stroke="currentColor" stroke-linecap="round" stroke-linejoin="round" stroke-width="2"><circle cx="11" cy="11" r="8"/><path d="m21 21l-4.35-4.35M8 11h6"/></g></svg>"#;
pub const INTERFACE_BUTTON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><g fill="none" stroke="currentColor" stroke-linecap="round" stroke-linejoin="round" stroke-width="2"><path d="M10.733 5.076a10.744 10.744 0 0 1 11.205 6.575a1 1 0 0 1 0 .696a10.8 10.8 0 0 1-1.444 2.49m-6.41-.679a3 3 0 0 1-4.242-4.242"/><path d="M17.479 17.499a10.75 10.75 0 0 1-15.417-5.151a1 1 0 0 1 0-.696a10.75 10.75 0 0 1 4.446-5.143M2 2l20 20"/></g></svg>"#;
pub const INFO_BUTTON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><g fill="none"><circle cx="12" cy="12" r="9.25" stroke="currentColor" stroke-width="1.5"/><path stroke="currentColor" stroke-linecap="round" stroke-width="1.5" d="M12 11.813v5"/><circle cx="12" cy="8.438" r="1.25" fill="currentColor"/></g></svg>"#;
